#![no_std]

extern crate alloc;

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    fmt::{self, Formatter},
    hash::Hash,
    ops::Deref,
};

use command::{Action, ActionCommand, Command, InterruptionBehavior, IntoCommand, Outline};
use event::EventLoop;
use hashbrown::{HashMap, HashSet};
use subsystem::Subsystem;
use time::Clock;
use tracing::{debug, info};

pub mod command;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod named;
pub mod robot;
pub mod subsystem;
pub mod time;

pub use error::{Error, Result, SetDefaultCommandError};

#[derive(Clone)]
pub struct SubsystemRef(Rc<RefCell<dyn Subsystem>>);

impl SubsystemRef {
    pub fn of<S: Subsystem + 'static>(subsystem: &Rc<RefCell<S>>) -> Self {
        Self(subsystem.clone())
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }
}

impl PartialEq for SubsystemRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}
impl Eq for SubsystemRef {}

impl Hash for SubsystemRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for SubsystemRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(subsystem) => fmt::Debug::fmt(&*subsystem, f),
            Err(_) => write!(f, "SubsystemRef({:p})", self.addr()),
        }
    }
}

impl From<Rc<RefCell<dyn Subsystem>>> for SubsystemRef {
    fn from(subsystem: Rc<RefCell<dyn Subsystem>>) -> Self {
        Self(subsystem)
    }
}

impl<T: Subsystem + 'static> From<T> for SubsystemRef {
    fn from(subsystem: T) -> Self {
        Self(Rc::new(RefCell::new(subsystem)))
    }
}

impl Deref for SubsystemRef {
    type Target = Rc<RefCell<dyn Subsystem>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Clone)]
pub struct CommandRef(Rc<RefCell<dyn Command>>);

impl CommandRef {
    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }

    pub fn name(&self) -> &'static str {
        self.0.borrow().name()
    }

    pub fn outline(&self) -> Outline {
        self.0.borrow().outline()
    }

    fn requirements(&self) -> Vec<SubsystemRef> {
        self.0.borrow().get_requirements().to_vec()
    }

    fn runs_when_disabled(&self) -> bool {
        self.0.borrow().runs_when_disabled()
    }

    fn interruption_behavior(&self) -> InterruptionBehavior {
        self.0.borrow().get_interruption_behavior()
    }
}

impl PartialEq for CommandRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}
impl Eq for CommandRef {}

impl Hash for CommandRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(command) => write!(f, "CommandRef({})", command.name()),
            Err(_) => write!(f, "CommandRef({:p})", self.addr()),
        }
    }
}

impl From<Rc<RefCell<dyn Command>>> for CommandRef {
    fn from(command: Rc<RefCell<dyn Command>>) -> Self {
        Self(command)
    }
}

impl<T: Command + 'static> From<T> for CommandRef {
    fn from(command: T) -> Self {
        Self(Rc::new(RefCell::new(command)))
    }
}

impl Deref for CommandRef {
    type Target = Rc<RefCell<dyn Command>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct CommandSchedulerState {
    clock: Rc<dyn Clock>,
    subsystems: RefCell<Vec<SubsystemRef>>,
    default_commands: RefCell<HashMap<SubsystemRef, CommandRef>>,
    enabled: Cell<bool>,
    in_run_loop: Cell<bool>,
    to_schedule: RefCell<Vec<CommandRef>>,
    to_cancel: RefCell<Vec<CommandRef>>,
    scheduled_commands: RefCell<Vec<CommandRef>>,
    requirements: RefCell<HashMap<SubsystemRef, CommandRef>>,
    button_loop: Rc<RefCell<EventLoop>>,
    ending_commands: RefCell<HashSet<CommandRef>>,
}

impl CommandSchedulerState {
    #[inline]
    fn is_scheduled(&self, command: &CommandRef) -> bool {
        self.scheduled_commands.borrow().contains(command)
    }

    fn requiring(&self, subsystem: &SubsystemRef) -> Option<CommandRef> {
        self.requirements.borrow().get(subsystem).cloned()
    }

    fn init_command(&self, command: CommandRef, requirements: Vec<SubsystemRef>) -> Result {
        self.requirements
            .borrow_mut()
            .extend(requirements.into_iter().map(|r| (r, command.clone())));
        self.scheduled_commands.borrow_mut().push(command.clone());

        let initialized = command.0.borrow_mut().initialize();
        if let Err(error) = initialized {
            self.scheduled_commands.borrow_mut().retain(|c| c != &command);
            self.requirements.borrow_mut().retain(|_, c| c != &command);
            return Err(error);
        }
        debug!(command = command.name(), "command initialized");
        Ok(())
    }

    /// Ends a scheduled command right away and releases its requirements.
    fn finish(&self, command: &CommandRef, interrupted: bool) -> Result {
        self.ending_commands.borrow_mut().insert(command.clone());
        let result = command.0.borrow_mut().end(interrupted);
        self.ending_commands.borrow_mut().remove(command);

        self.scheduled_commands.borrow_mut().retain(|c| c != command);
        self.requirements.borrow_mut().retain(|_, c| c != command);

        if interrupted {
            info!(command = command.name(), "command interrupted");
        } else {
            debug!(command = command.name(), "command finished");
        }
        result
    }

    fn cancel(&self, command: &CommandRef) -> Result {
        if self.ending_commands.borrow().contains(command) {
            return Ok(());
        }

        if self.in_run_loop.get() {
            self.to_cancel.borrow_mut().push(command.clone());
            return Ok(());
        }

        if !self.is_scheduled(command) {
            return Ok(());
        }

        self.finish(command, true)
    }

    fn schedule_now(&self, command: CommandRef) -> Result {
        if self.is_scheduled(&command) {
            return Ok(());
        }

        if !self.enabled.get() && !command.runs_when_disabled() {
            debug!(command = command.name(), "not scheduling while disabled");
            return Ok(());
        }

        let requirements = command.requirements();
        let mut requiring_commands: Vec<CommandRef> = Vec::new();
        for requiring in requirements.iter().filter_map(|r| self.requiring(r)) {
            if !requiring_commands.contains(&requiring) {
                requiring_commands.push(requiring);
            }
        }

        for requiring in &requiring_commands {
            if requiring.interruption_behavior() == InterruptionBehavior::CancelIncoming {
                debug!(
                    command = command.name(),
                    running = requiring.name(),
                    "incoming command rejected"
                );
                return Ok(());
            }
        }

        for requiring in &requiring_commands {
            self.cancel(requiring)?;
        }

        self.init_command(command, requirements)
    }

    fn run_scheduled(&self) -> Result {
        let disabled = !self.enabled.get();
        let scheduled_commands = self.scheduled_commands.borrow().clone();

        for command in scheduled_commands {
            if !self.is_scheduled(&command) {
                continue;
            }

            if disabled && !command.runs_when_disabled() {
                self.finish(&command, true)?;
                continue;
            }

            let finished = {
                let mut command_ref = command.0.borrow_mut();
                command_ref.execute()?;
                command_ref.is_finished()?
            };
            if finished {
                self.finish(&command, false)?;
            }
        }

        Ok(())
    }
}

/// Runs commands against registered subsystems, once per robot loop iteration.
///
/// Cloning the scheduler yields another handle to the same scheduler.
#[derive(Clone)]
pub struct CommandScheduler(Rc<CommandSchedulerState>);

impl CommandScheduler {
    /// A disabled scheduler timing its commands with `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self(Rc::new(CommandSchedulerState {
            clock,
            subsystems: RefCell::default(),
            default_commands: RefCell::default(),
            enabled: Cell::new(false),
            in_run_loop: Cell::new(false),
            to_schedule: RefCell::default(),
            to_cancel: RefCell::default(),
            scheduled_commands: RefCell::default(),
            requirements: RefCell::default(),
            button_loop: Rc::default(),
            ending_commands: RefCell::default(),
        }))
    }

    /// Register a subsystem with the scheduler.
    pub fn register<S: Subsystem + 'static>(&self, subsystem: S) -> Rc<RefCell<S>> {
        let subsystem = Rc::new(RefCell::new(subsystem));
        let subsystem_ref = SubsystemRef::of(&subsystem);
        debug!(subsystem = ?subsystem_ref, "registered subsystem");
        self.0.subsystems.borrow_mut().push(subsystem_ref);
        subsystem
    }

    /// Wraps `action` in a command timed by this scheduler's clock.
    pub fn command(&self, action: impl Into<Action>) -> CommandRef {
        CommandRef::from(ActionCommand::new(action.into(), self.0.clock.clone()))
    }

    /// Schedule a command to run. Commands scheduled from inside a command are started
    /// after the current run finishes.
    pub fn schedule(&self, command: impl IntoCommand) -> Result {
        let command = command.into_command(self);
        if self.0.in_run_loop.get() {
            self.0.to_schedule.borrow_mut().push(command);
            return Ok(());
        }

        self.0.schedule_now(command)
    }

    pub fn cancel(&self, command: &CommandRef) -> Result {
        self.0.cancel(command)
    }

    pub fn set_default_command<S>(
        &self,
        subsystem: &Rc<RefCell<S>>,
        command: impl IntoCommand,
    ) -> Result<(), SetDefaultCommandError>
    where
        S: Subsystem + 'static,
    {
        let subsystem = SubsystemRef::of(subsystem);
        let command = command.into_command(self);
        if !command.requirements().contains(&subsystem) {
            return Err(SetDefaultCommandError::MustRequireSubsystem);
        }
        if !self.0.subsystems.borrow().contains(&subsystem) {
            return Err(SetDefaultCommandError::NotRegistered);
        }

        debug!(command = command.name(), subsystem = ?subsystem, "default command set");
        self.0.default_commands.borrow_mut().insert(subsystem, command);
        Ok(())
    }

    pub fn remove_default_command<S>(&self, subsystem: &Rc<RefCell<S>>) -> Option<CommandRef>
    where
        S: Subsystem + 'static,
    {
        self.0
            .default_commands
            .borrow_mut()
            .remove(&SubsystemRef::of(subsystem))
    }

    /// Whether commands may start. A disabled scheduler interrupts every command that does
    /// not run when disabled.
    pub fn set_enabled(&self, enabled: bool) {
        if self.0.enabled.replace(enabled) != enabled {
            info!(enabled, "scheduler enable state changed");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.0.enabled.get()
    }

    /// One scheduler iteration: subsystem periodics, trigger bindings, scheduled commands,
    /// deferred schedules and cancels, then default commands for idle subsystems.
    pub fn run(&self) -> Result {
        let state = &self.0;

        let subsystems = state.subsystems.borrow().clone();
        for subsystem in &subsystems {
            let mut subsystem = subsystem.0.borrow_mut();
            subsystem.periodic()?;
            if robot::is_sim() {
                subsystem.sim_periodic()?;
            }
        }

        let button_loop = state.button_loop.clone();
        button_loop.borrow_mut().poll()?;

        state.in_run_loop.set(true);
        let result = state.run_scheduled();
        state.in_run_loop.set(false);
        result?;

        let to_schedule = state.to_schedule.take();
        for command in to_schedule {
            state.schedule_now(command)?;
        }

        let to_cancel = state.to_cancel.take();
        for command in to_cancel {
            state.cancel(&command)?;
        }

        // Add default commands for un-required registered subsystems.
        for subsystem in &subsystems {
            let default_command = state.default_commands.borrow().get(subsystem).cloned();
            if let Some(default_command) = default_command {
                if !state.requirements.borrow().contains_key(subsystem) {
                    state.schedule_now(default_command)?;
                }
            }
        }

        Ok(())
    }

    pub fn cancel_all(&self) -> Result {
        let scheduled_commands = self.0.scheduled_commands.borrow().clone();
        for command in scheduled_commands {
            self.0.cancel(&command)?;
        }

        Ok(())
    }

    pub fn button_event_loop(&self) -> Rc<RefCell<EventLoop>> {
        self.0.button_loop.clone()
    }

    pub fn is_scheduled(&self, command: &CommandRef) -> bool {
        self.0.is_scheduled(command)
    }

    /// The command currently holding `subsystem`, if any.
    pub fn requiring<S: Subsystem + 'static>(&self, subsystem: &Rc<RefCell<S>>) -> Option<CommandRef> {
        self.0.requiring(&SubsystemRef::of(subsystem))
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.0.clock.clone()
    }
}
