use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};

use crate::{
    constants::superstructure::{INTAKE_SPEED, OUTTAKE_SPEED},
    hardware::MotorOutput,
};

/// Floor rollers that pull notes into the robot.
#[derive(Debug)]
pub struct Intake {
    motor: Box<dyn MotorOutput>,
    speed: f64,
}

impl Intake {
    pub fn new(motor: Box<dyn MotorOutput>) -> Self {
        Self { motor, speed: 0.0 }
    }

    fn drive(&mut self, speed: f64) -> Result {
        self.speed = speed;
        self.motor.set_percent(speed)
    }

    pub fn intake(&mut self) -> Result {
        self.drive(INTAKE_SPEED)
    }

    pub fn out_take(&mut self) -> Result {
        self.drive(OUTTAKE_SPEED)
    }

    pub fn stop_intake(&mut self) -> Result {
        self.speed = 0.0;
        self.motor.stop()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Subsystem for Intake {}
