use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use bio_command::{
    command::{Action, Command},
    controller::CommandController,
    subsystem::Subsystem,
    Result, SubsystemRef,
};

use crate::{
    hardware::Color,
    subsystems::{Drivetrain, Hanger, Indexer, Intake, Led, Shooter},
};

/// Field-centric driving from the driver's sticks. Never finishes; meant as the
/// drivetrain's default command.
pub struct DriveWithJoystickCommand {
    drivetrain: Rc<RefCell<Drivetrain>>,
    controller: CommandController,
    requirements: Vec<SubsystemRef>,
}

impl DriveWithJoystickCommand {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, controller: CommandController) -> Self {
        Self {
            requirements: vec![SubsystemRef::of(&drivetrain)],
            drivetrain,
            controller,
        }
    }
}

impl Command for DriveWithJoystickCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        let mut drivetrain = self.drivetrain.borrow_mut();
        let request = drivetrain.limits().field_centric(
            self.controller.left_x(),
            self.controller.left_y(),
            self.controller.right_x(),
        );
        drivetrain.set_control(&request)
    }

    fn name(&self) -> &'static str {
        "DriveWithJoystickCommand"
    }
}

/// Runs the intake and feeds the indexer until a note trips the beam break.
pub struct IntakeCommand {
    intake: Rc<RefCell<Intake>>,
    indexer: Rc<RefCell<Indexer>>,
    requirements: Vec<SubsystemRef>,
}

impl IntakeCommand {
    pub fn new(intake: Rc<RefCell<Intake>>, indexer: Rc<RefCell<Indexer>>) -> Self {
        Self {
            requirements: vec![SubsystemRef::of(&intake), SubsystemRef::of(&indexer)],
            intake,
            indexer,
        }
    }
}

impl Command for IntakeCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.intake.borrow_mut().intake()?;
        self.indexer.borrow_mut().feed()
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.intake.borrow_mut().stop_intake()?;
        self.indexer.borrow_mut().stop_indexer()
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.indexer.borrow().has_note())
    }

    fn name(&self) -> &'static str {
        "IntakeCommand"
    }
}

/// Shows whether a note is held: green with one, red without.
pub struct UpdateLedCommand {
    led: Rc<RefCell<Led>>,
    indexer: Rc<RefCell<Indexer>>,
    requirements: Vec<SubsystemRef>,
}

impl UpdateLedCommand {
    pub fn new(led: Rc<RefCell<Led>>, indexer: Rc<RefCell<Indexer>>) -> Self {
        Self {
            requirements: vec![SubsystemRef::of(&led)],
            led,
            indexer,
        }
    }
}

impl Command for UpdateLedCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        let color = if self.indexer.borrow().has_note() {
            Color::GREEN
        } else {
            Color::RED
        };
        self.led.borrow_mut().set_color(color)
    }

    fn runs_when_disabled(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "UpdateLedCommand"
    }
}

/// A labelled one-shot call on `subsystem`. It claims no requirements, so firing it never
/// interrupts whatever command holds the subsystem.
pub fn instant<S: Subsystem + 'static>(
    label: &'static str,
    subsystem: &Rc<RefCell<S>>,
    action: fn(&mut S) -> Result,
) -> Action {
    let subsystem = subsystem.clone();
    Action::instant(label, move || action(&mut subsystem.borrow_mut()))
}

pub fn spin_up(shooter: &Rc<RefCell<Shooter>>) -> Action {
    instant("spin up", shooter, |shooter| shooter.spin_up())
}

pub fn amp_shot(shooter: &Rc<RefCell<Shooter>>) -> Action {
    instant("amp shot", shooter, |shooter| shooter.amp_shot())
}

pub fn stop_shooter(shooter: &Rc<RefCell<Shooter>>) -> Action {
    instant("stop shooter", shooter, |shooter| shooter.stop_shooter())
}

pub fn pass(indexer: &Rc<RefCell<Indexer>>) -> Action {
    instant("pass", indexer, |indexer| indexer.pass())
}

pub fn reverse_indexer(indexer: &Rc<RefCell<Indexer>>) -> Action {
    instant("reverse indexer", indexer, |indexer| indexer.reverse_indexer())
}

pub fn stop_indexer(indexer: &Rc<RefCell<Indexer>>) -> Action {
    instant("stop indexer", indexer, |indexer| indexer.stop_indexer())
}

pub fn intake(intake: &Rc<RefCell<Intake>>) -> Action {
    instant("intake", intake, |intake| intake.intake())
}

pub fn out_take(intake: &Rc<RefCell<Intake>>) -> Action {
    instant("out take", intake, |intake| intake.out_take())
}

pub fn stop_intake(intake: &Rc<RefCell<Intake>>) -> Action {
    instant("stop intake", intake, |intake| intake.stop_intake())
}

pub fn extend_hanger(hanger: &Rc<RefCell<Hanger>>) -> Action {
    instant("extend hanger", hanger, |hanger| hanger.extend_hanger())
}

pub fn retract_hanger(hanger: &Rc<RefCell<Hanger>>) -> Action {
    instant("retract hanger", hanger, |hanger| hanger.retract_hanger())
}

pub fn stop_hanger(hanger: &Rc<RefCell<Hanger>>) -> Action {
    instant("stop hanger", hanger, |hanger| hanger.stop_hanger())
}
