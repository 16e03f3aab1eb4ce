use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};

use crate::{
    constants::superstructure::{HANGER_EXTEND_SPEED, HANGER_RETRACT_SPEED},
    hardware::MotorOutput,
};

/// The climber.
#[derive(Debug)]
pub struct Hanger {
    motor: Box<dyn MotorOutput>,
}

impl Hanger {
    pub fn new(motor: Box<dyn MotorOutput>) -> Self {
        Self { motor }
    }

    pub fn extend_hanger(&mut self) -> Result {
        self.motor.set_percent(HANGER_EXTEND_SPEED)
    }

    pub fn retract_hanger(&mut self) -> Result {
        self.motor.set_percent(HANGER_RETRACT_SPEED)
    }

    pub fn stop_hanger(&mut self) -> Result {
        self.motor.stop()
    }
}

impl Subsystem for Hanger {}
