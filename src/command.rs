use alloc::{boxed::Box, vec::Vec};

use crate::{CommandRef, CommandScheduler, Result, SubsystemRef};

pub mod action;
pub mod button;

pub use action::{Action, ActionCommand, Outline};

/// An action the robot can perform. Runs when scheduled, until it is interrupted or it finishes.
pub trait Command {
    fn get_requirements(&self) -> &[SubsystemRef];

    /// The initial subroutine of a command. Called once when the command is initially scheduled.
    fn initialize(&mut self) -> Result {
        Ok(())
    }
    /// Called once per scheduler run while the command is scheduled.
    fn execute(&mut self) -> Result {
        Ok(())
    }
    /// Called once when the command finishes or is interrupted.
    #[allow(unused_variables)]
    fn end(&mut self, interrupted: bool) -> Result {
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(false)
    }

    fn runs_when_disabled(&self) -> bool {
        false
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        InterruptionBehavior::default()
    }

    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// The shape of this command as seen from a composition.
    fn outline(&self) -> Outline {
        Outline::Command(self.name())
    }
}

pub trait CommandRefExt {
    fn schedule(&self, scheduler: &CommandScheduler) -> Result;
    fn cancel(&self, scheduler: &CommandScheduler) -> Result;
    fn is_scheduled(&self, scheduler: &CommandScheduler) -> bool;
}

impl CommandRefExt for CommandRef {
    fn schedule(&self, scheduler: &CommandScheduler) -> Result {
        scheduler.schedule(self.clone())
    }

    fn cancel(&self, scheduler: &CommandScheduler) -> Result {
        scheduler.cancel(self)
    }

    fn is_scheduled(&self, scheduler: &CommandScheduler) -> bool {
        scheduler.is_scheduled(self)
    }
}

/// Anything that can be bound to a trigger or registered by name.
pub trait IntoCommand {
    fn into_command(self, scheduler: &CommandScheduler) -> CommandRef;
}

impl IntoCommand for CommandRef {
    fn into_command(self, _scheduler: &CommandScheduler) -> CommandRef {
        self
    }
}

impl IntoCommand for Action {
    fn into_command(self, scheduler: &CommandScheduler) -> CommandRef {
        scheduler.command(self)
    }
}

impl<C: Command + 'static> IntoCommand for C {
    fn into_command(self, _scheduler: &CommandScheduler) -> CommandRef {
        CommandRef::from(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptionBehavior {
    #[default]
    CancelSelf,
    CancelIncoming,
}

pub struct FunctionalCommand {
    name: &'static str,
    on_init: Box<dyn FnMut() -> Result>,
    on_execute: Box<dyn FnMut() -> Result>,
    on_end: Box<dyn FnMut(bool) -> Result>,
    is_finished: Box<dyn Fn() -> Result<bool>>,
    requirements: Vec<SubsystemRef>,
}

impl FunctionalCommand {
    pub fn new(
        on_init: impl FnMut() -> Result + 'static,
        on_execute: impl FnMut() -> Result + 'static,
        on_end: impl FnMut(bool) -> Result + 'static,
        is_finished: impl Fn() -> Result<bool> + 'static,
        requirements: Vec<SubsystemRef>,
    ) -> Self {
        Self {
            name: "FunctionalCommand",
            on_init: Box::new(on_init),
            on_execute: Box::new(on_execute),
            on_end: Box::new(on_end),
            is_finished: Box::new(is_finished),
            requirements,
        }
    }

    /// A command that runs `action` once when scheduled and finishes on the next run.
    pub fn instant(action: impl FnMut() -> Result + 'static, requirements: Vec<SubsystemRef>) -> Self {
        Self::new(action, || Ok(()), |_| Ok(()), || Ok(true), requirements).named("InstantCommand")
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl Command for FunctionalCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        (self.on_init)()
    }

    fn execute(&mut self) -> Result {
        (self.on_execute)()
    }

    fn end(&mut self, interrupted: bool) -> Result {
        (self.on_end)(interrupted)
    }

    fn is_finished(&self) -> Result<bool> {
        (self.is_finished)()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[macro_export]
macro_rules! run_once {
    ($on_init:block) => {
        $crate::command::FunctionalCommand::new(
            move || $on_init,
            || Ok(()),
            |_| Ok(()),
            || Ok(true),
            ::core::default::Default::default(),
        )
    };
    ($on_init:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $on_init,
            || Ok(()),
            |_| Ok(()),
            || Ok(true),
            ::core::iter::IntoIterator::into_iter([$($requirement),+]).collect(),
        )
    };
}

#[macro_export]
macro_rules! run {
    ($on_execute:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::core::default::Default::default(),
        )
    };
    ($on_execute:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::core::iter::IntoIterator::into_iter([$($requirement),+]).collect(),
        )
    };
}

#[macro_export]
macro_rules! start_end {
    ($start:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::core::default::Default::default(),
        )
    };
    ($start:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::core::iter::IntoIterator::into_iter([$($requirement),+]).collect(),
        )
    };
}

#[macro_export]
macro_rules! run_end {
    ($execute:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::core::default::Default::default(),
        )
    };
    ($execute:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::core::iter::IntoIterator::into_iter([$($requirement),+]).collect(),
        )
    };
}
