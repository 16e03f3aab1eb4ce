//! Composable actions and the interpreter that runs them.
//!
//! An [`Action`] is a tree: leaves do work (an instantaneous closure, a wait, or any other
//! [`Command`]), branches decide how their children are stepped. [`ActionCommand`] drives a
//! tree through the scheduler's command lifecycle using the scheduler's clock.

use alloc::{boxed::Box, rc::Rc, vec, vec::Vec};
use core::time::Duration;

use super::{Command, InterruptionBehavior};
use crate::{time::Clock, Result, SubsystemRef};

pub enum Action {
    /// Runs a closure once, when the action starts.
    Instant(Instant),
    /// Does nothing until a fixed duration has elapsed.
    Wait(Wait),
    /// Any other command, driven through its own lifecycle.
    Command(Box<dyn Command>),
    /// Runs each step to completion, strictly in order.
    Sequential(Sequential),
    /// Starts every branch at once and finishes when all have finished.
    Parallel(Parallel),
    /// Picks one of two actions when started.
    Conditional(Conditional),
    /// Ends the inner action once a deadline passes.
    Timeout(Timeout),
}

pub struct Instant {
    label: &'static str,
    run: Box<dyn FnMut() -> Result>,
    requirements: Vec<SubsystemRef>,
}

pub struct Wait {
    duration: Duration,
    started: Duration,
}

pub struct Sequential {
    steps: Vec<Action>,
    current: usize,
}

pub struct Parallel {
    branches: Vec<Action>,
    running: Vec<bool>,
}

pub struct Conditional {
    condition: Box<dyn Fn() -> bool>,
    on_true: Box<Action>,
    on_false: Box<Action>,
    selected: bool,
}

pub struct Timeout {
    action: Box<Action>,
    duration: Duration,
    started: Duration,
    running: bool,
}

/// The label-only shape of an [`Action`], comparable with `==`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Instant(&'static str),
    Wait(Duration),
    Command(&'static str),
    Sequential(Vec<Outline>),
    Parallel(Vec<Outline>),
    Conditional {
        on_true: Box<Outline>,
        on_false: Box<Outline>,
    },
    Timeout {
        action: Box<Outline>,
        duration: Duration,
    },
}

impl Action {
    pub fn instant(label: &'static str, run: impl FnMut() -> Result + 'static) -> Self {
        Self::Instant(Instant {
            label,
            run: Box::new(run),
            requirements: Vec::new(),
        })
    }

    pub fn wait(duration: Duration) -> Self {
        Self::Wait(Wait {
            duration,
            started: Duration::ZERO,
        })
    }

    pub fn command(command: impl Command + 'static) -> Self {
        Self::Command(Box::new(command))
    }

    pub fn sequence(steps: Vec<Action>) -> Self {
        Self::Sequential(Sequential { steps, current: 0 })
    }

    pub fn parallel(branches: Vec<Action>) -> Self {
        let running = vec![false; branches.len()];
        Self::Parallel(Parallel { branches, running })
    }

    /// Runs `on_true` if `condition` holds when the action starts, `on_false` otherwise.
    pub fn either(on_true: Action, on_false: Action, condition: impl Fn() -> bool + 'static) -> Self {
        Self::Conditional(Conditional {
            condition: Box::new(condition),
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
            selected: true,
        })
    }

    /// An action that finishes as soon as it starts.
    pub fn none() -> Self {
        Self::sequence(Vec::new())
    }

    pub fn with_timeout(self, duration: Duration) -> Self {
        Self::Timeout(Timeout {
            action: Box::new(self),
            duration,
            started: Duration::ZERO,
            running: false,
        })
    }

    /// Adds subsystem requirements to an instantaneous action. Other actions take their
    /// requirements from their children.
    pub fn requiring(mut self, requirements: impl IntoIterator<Item = SubsystemRef>) -> Self {
        if let Self::Instant(instant) = &mut self {
            instant.requirements.extend(requirements);
        }
        self
    }

    pub fn initialize(&mut self, now: Duration) -> Result {
        match self {
            Self::Instant(instant) => (instant.run)(),
            Self::Wait(wait) => {
                wait.started = now;
                Ok(())
            }
            Self::Command(command) => command.initialize(),
            Self::Sequential(sequential) => {
                sequential.current = 0;
                match sequential.steps.first_mut() {
                    Some(step) => step.initialize(now),
                    None => Ok(()),
                }
            }
            Self::Parallel(parallel) => {
                for (branch, running) in parallel.branches.iter_mut().zip(&mut parallel.running) {
                    *running = true;
                    branch.initialize(now)?;
                }
                Ok(())
            }
            Self::Conditional(conditional) => {
                conditional.selected = (conditional.condition)();
                conditional.branch_mut().initialize(now)
            }
            Self::Timeout(timeout) => {
                timeout.started = now;
                timeout.running = true;
                timeout.action.initialize(now)
            }
        }
    }

    pub fn execute(&mut self, now: Duration) -> Result {
        match self {
            Self::Instant(_) | Self::Wait(_) => Ok(()),
            Self::Command(command) => command.execute(),
            Self::Sequential(sequential) => {
                let Some(step) = sequential.steps.get_mut(sequential.current) else {
                    return Ok(());
                };
                step.execute(now)?;
                if step.is_finished(now)? {
                    step.end(false)?;
                    sequential.current += 1;
                    if let Some(next) = sequential.steps.get_mut(sequential.current) {
                        next.initialize(now)?;
                    }
                }
                Ok(())
            }
            Self::Parallel(parallel) => {
                for (branch, running) in parallel.branches.iter_mut().zip(&mut parallel.running) {
                    if !*running {
                        continue;
                    }
                    branch.execute(now)?;
                    if branch.is_finished(now)? {
                        branch.end(false)?;
                        *running = false;
                    }
                }
                Ok(())
            }
            Self::Conditional(conditional) => conditional.branch_mut().execute(now),
            Self::Timeout(timeout) => {
                if timeout.running {
                    timeout.action.execute(now)?;
                    if timeout.action.is_finished(now)? {
                        timeout.running = false;
                        timeout.action.end(false)?;
                    }
                }
                Ok(())
            }
        }
    }

    pub fn is_finished(&self, now: Duration) -> Result<bool> {
        match self {
            Self::Instant(_) => Ok(true),
            Self::Wait(wait) => Ok(now.saturating_sub(wait.started) >= wait.duration),
            Self::Command(command) => command.is_finished(),
            Self::Sequential(sequential) => Ok(sequential.current >= sequential.steps.len()),
            Self::Parallel(parallel) => Ok(!parallel.running.contains(&true)),
            Self::Conditional(conditional) => conditional.branch().is_finished(now),
            Self::Timeout(timeout) => {
                Ok(!timeout.running || now.saturating_sub(timeout.started) >= timeout.duration)
            }
        }
    }

    pub fn end(&mut self, interrupted: bool) -> Result {
        match self {
            Self::Instant(_) | Self::Wait(_) => Ok(()),
            Self::Command(command) => command.end(interrupted),
            Self::Sequential(sequential) => {
                let current = sequential.current;
                sequential.current = sequential.steps.len();
                match sequential.steps.get_mut(current) {
                    Some(step) if interrupted => step.end(true),
                    _ => Ok(()),
                }
            }
            Self::Parallel(parallel) => {
                for (branch, running) in parallel.branches.iter_mut().zip(&mut parallel.running) {
                    if *running {
                        *running = false;
                        branch.end(true)?;
                    }
                }
                Ok(())
            }
            Self::Conditional(conditional) => conditional.branch_mut().end(interrupted),
            Self::Timeout(timeout) => {
                if timeout.running {
                    timeout.running = false;
                    timeout.action.end(true)?;
                }
                Ok(())
            }
        }
    }

    /// Every subsystem required anywhere in the tree, without duplicates.
    pub fn requirements(&self) -> Vec<SubsystemRef> {
        let mut requirements = Vec::new();
        self.collect_requirements(&mut requirements);
        requirements
    }

    fn collect_requirements(&self, into: &mut Vec<SubsystemRef>) {
        let mut add = |subsystem: &SubsystemRef| {
            if !into.contains(subsystem) {
                into.push(subsystem.clone());
            }
        };
        match self {
            Self::Instant(instant) => instant.requirements.iter().for_each(add),
            Self::Wait(_) => {}
            Self::Command(command) => command.get_requirements().iter().for_each(add),
            Self::Sequential(Sequential { steps: children, .. })
            | Self::Parallel(Parallel {
                branches: children, ..
            }) => {
                for child in children {
                    child.collect_requirements(into);
                }
            }
            Self::Conditional(conditional) => {
                conditional.on_true.collect_requirements(into);
                conditional.on_false.collect_requirements(into);
            }
            Self::Timeout(timeout) => timeout.action.collect_requirements(into),
        }
    }

    pub fn runs_when_disabled(&self) -> bool {
        match self {
            Self::Instant(_) => false,
            Self::Wait(_) => true,
            Self::Command(command) => command.runs_when_disabled(),
            Self::Sequential(Sequential { steps: children, .. })
            | Self::Parallel(Parallel {
                branches: children, ..
            }) => children.iter().all(Action::runs_when_disabled),
            Self::Conditional(conditional) => {
                conditional.on_true.runs_when_disabled() && conditional.on_false.runs_when_disabled()
            }
            Self::Timeout(timeout) => timeout.action.runs_when_disabled(),
        }
    }

    /// A composition refuses interruption if any command inside it does.
    pub fn interruption_behavior(&self) -> InterruptionBehavior {
        let cancel_incoming = match self {
            Self::Instant(_) | Self::Wait(_) => false,
            Self::Command(command) => {
                command.get_interruption_behavior() == InterruptionBehavior::CancelIncoming
            }
            Self::Sequential(Sequential { steps: children, .. })
            | Self::Parallel(Parallel {
                branches: children, ..
            }) => children
                .iter()
                .any(|child| child.interruption_behavior() == InterruptionBehavior::CancelIncoming),
            Self::Conditional(conditional) => [&conditional.on_true, &conditional.on_false]
                .iter()
                .any(|child| child.interruption_behavior() == InterruptionBehavior::CancelIncoming),
            Self::Timeout(timeout) => {
                timeout.action.interruption_behavior() == InterruptionBehavior::CancelIncoming
            }
        };
        if cancel_incoming {
            InterruptionBehavior::CancelIncoming
        } else {
            InterruptionBehavior::CancelSelf
        }
    }

    pub fn outline(&self) -> Outline {
        match self {
            Self::Instant(instant) => Outline::Instant(instant.label),
            Self::Wait(wait) => Outline::Wait(wait.duration),
            Self::Command(command) => command.outline(),
            Self::Sequential(sequential) => {
                Outline::Sequential(sequential.steps.iter().map(Action::outline).collect())
            }
            Self::Parallel(parallel) => {
                Outline::Parallel(parallel.branches.iter().map(Action::outline).collect())
            }
            Self::Conditional(conditional) => Outline::Conditional {
                on_true: Box::new(conditional.on_true.outline()),
                on_false: Box::new(conditional.on_false.outline()),
            },
            Self::Timeout(timeout) => Outline::Timeout {
                action: Box::new(timeout.action.outline()),
                duration: timeout.duration,
            },
        }
    }
}

impl Conditional {
    fn branch(&self) -> &Action {
        if self.selected {
            &self.on_true
        } else {
            &self.on_false
        }
    }

    fn branch_mut(&mut self) -> &mut Action {
        if self.selected {
            &mut self.on_true
        } else {
            &mut self.on_false
        }
    }
}

impl<C: Command + 'static> From<C> for Action {
    fn from(command: C) -> Self {
        Self::command(command)
    }
}

/// Runs an [`Action`] tree as a scheduler command, timing waits and timeouts with `clock`.
pub struct ActionCommand {
    action: Action,
    clock: Rc<dyn Clock>,
    requirements: Vec<SubsystemRef>,
}

impl ActionCommand {
    pub fn new(action: Action, clock: Rc<dyn Clock>) -> Self {
        Self {
            requirements: action.requirements(),
            action,
            clock,
        }
    }
}

impl Command for ActionCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.action.initialize(self.clock.now())
    }

    fn execute(&mut self) -> Result {
        self.action.execute(self.clock.now())
    }

    fn end(&mut self, interrupted: bool) -> Result {
        self.action.end(interrupted)
    }

    fn is_finished(&self) -> Result<bool> {
        self.action.is_finished(self.clock.now())
    }

    fn runs_when_disabled(&self) -> bool {
        self.action.runs_when_disabled()
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        self.action.interruption_behavior()
    }

    fn name(&self) -> &'static str {
        match &self.action {
            Action::Instant(instant) => instant.label,
            Action::Command(command) => command.name(),
            _ => "ActionCommand",
        }
    }

    fn outline(&self) -> Outline {
        self.action.outline()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String, vec::Vec};
    use core::cell::RefCell;

    use super::*;
    use crate::time::ManualClock;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn record(log: &Log, label: &'static str) -> Action {
        let log = log.clone();
        Action::instant(label, move || {
            log.borrow_mut().push(label);
            Ok(())
        })
    }

    /// Steps `action` the way the scheduler would, until it finishes or `ticks` run out.
    fn run_ticks(action: &mut Action, clock: &ManualClock, ticks: usize) -> Option<usize> {
        for tick in 0..ticks {
            action.execute(clock.now()).unwrap();
            if action.is_finished(clock.now()).unwrap() {
                action.end(false).unwrap();
                return Some(tick);
            }
            clock.advance(Duration::from_millis(20));
        }
        None
    }

    #[test]
    fn sequential_runs_steps_in_order() {
        let log = Log::default();
        let clock = ManualClock::new();
        let mut action = Action::sequence(vec![
            record(&log, "first"),
            Action::wait(Duration::from_millis(100)),
            record(&log, "second"),
        ]);

        action.initialize(clock.now()).unwrap();
        assert_eq!(*log.borrow(), ["first"]);

        clock.advance(Duration::from_millis(60));
        action.execute(clock.now()).unwrap();
        action.execute(clock.now()).unwrap();
        assert_eq!(*log.borrow(), ["first"]);

        clock.advance(Duration::from_millis(40));
        assert!(run_ticks(&mut action, &clock, 10).is_some());
        assert_eq!(*log.borrow(), ["first", "second"]);
    }

    #[test]
    fn parallel_finishes_when_all_branches_finish() {
        let log = Log::default();
        let clock = ManualClock::new();
        let mut action = Action::parallel(vec![
            record(&log, "now"),
            Action::wait(Duration::from_millis(200)),
        ]);

        action.initialize(clock.now()).unwrap();
        assert_eq!(*log.borrow(), ["now"]);
        action.execute(clock.now()).unwrap();
        assert!(!action.is_finished(clock.now()).unwrap());

        clock.advance(Duration::from_millis(200));
        action.execute(clock.now()).unwrap();
        assert!(action.is_finished(clock.now()).unwrap());
    }

    #[test]
    fn conditional_picks_branch_when_started() {
        let log = Log::default();
        let clock = ManualClock::new();
        let flag = Rc::new(RefCell::new(true));

        let condition = flag.clone();
        let mut action = Action::either(record(&log, "yes"), record(&log, "no"), move || {
            *condition.borrow()
        });

        action.initialize(clock.now()).unwrap();
        *flag.borrow_mut() = false;
        assert!(run_ticks(&mut action, &clock, 2).is_some());
        action.initialize(clock.now()).unwrap();

        assert_eq!(*log.borrow(), ["yes", "no"]);
    }

    #[test]
    fn timeout_interrupts_long_running_action() {
        let ended = Rc::new(RefCell::new(None));
        let clock = ManualClock::new();

        let on_end = ended.clone();
        let endless = crate::command::FunctionalCommand::new(
            || Ok(()),
            || Ok(()),
            move |interrupted| {
                *on_end.borrow_mut() = Some(interrupted);
                Ok(())
            },
            || Ok(false),
            Vec::new(),
        );
        let mut action = Action::from(endless).with_timeout(Duration::from_millis(500));

        action.initialize(clock.now()).unwrap();
        // 25 ticks of 20ms reach the deadline on the 26th check.
        assert_eq!(run_ticks(&mut action, &clock, 100), Some(25));
        assert_eq!(*ended.borrow(), Some(true));
    }

    #[test]
    fn timeout_finishes_early_with_inner_action() {
        let clock = ManualClock::new();
        let mut action = Action::wait(Duration::from_millis(40)).with_timeout(Duration::from_secs(1));

        action.initialize(clock.now()).unwrap();
        assert_eq!(run_ticks(&mut action, &clock, 100), Some(2));
    }

    #[test]
    fn interrupting_sequence_ends_only_the_current_step() {
        let ends = Rc::new(RefCell::new(Vec::<(String, bool)>::new()));
        let clock = ManualClock::new();

        let step = |label: &'static str| {
            let ends = ends.clone();
            Action::from(crate::command::FunctionalCommand::new(
                || Ok(()),
                || Ok(()),
                move |interrupted| {
                    ends.borrow_mut().push((String::from(label), interrupted));
                    Ok(())
                },
                || Ok(false),
                Vec::new(),
            ))
        };
        let mut action = Action::sequence(vec![step("a"), step("b")]);

        action.initialize(clock.now()).unwrap();
        action.execute(clock.now()).unwrap();
        action.end(true).unwrap();

        assert_eq!(*ends.borrow(), [(String::from("a"), true)]);
    }

    #[test]
    fn empty_sequence_is_finished_immediately() {
        let clock = ManualClock::new();
        let mut action = Action::none();
        action.initialize(clock.now()).unwrap();
        assert!(action.is_finished(clock.now()).unwrap());
    }

    #[test]
    fn requirements_are_gathered_from_the_whole_tree() {
        #[derive(Debug)]
        struct Roller;
        impl crate::subsystem::Subsystem for Roller {}

        let (left, right) = (SubsystemRef::from(Roller), SubsystemRef::from(Roller));
        let action = Action::parallel(vec![
            Action::instant("left", || Ok(())).requiring([left.clone()]),
            Action::sequence(vec![
                Action::wait(Duration::from_millis(20)),
                Action::instant("both", || Ok(())).requiring([left.clone(), right.clone()]),
            ]),
        ]);

        assert_eq!(action.requirements(), [left, right]);
        assert!(!action.runs_when_disabled());
        assert_eq!(action.interruption_behavior(), InterruptionBehavior::CancelSelf);
    }

    #[test]
    fn outline_mirrors_the_tree() {
        let log = Log::default();
        let action = Action::parallel(vec![
            record(&log, "spin up"),
            Action::sequence(vec![Action::wait(Duration::from_secs(1)), record(&log, "pass")]),
        ])
        .with_timeout(Duration::from_secs(3));

        assert_eq!(
            action.outline(),
            Outline::Timeout {
                action: Box::new(Outline::Parallel(vec![
                    Outline::Instant("spin up"),
                    Outline::Sequential(vec![
                        Outline::Wait(Duration::from_secs(1)),
                        Outline::Instant("pass"),
                    ]),
                ])),
                duration: Duration::from_secs(3),
            }
        );
    }
}
