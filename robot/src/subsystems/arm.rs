use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};

use crate::{
    constants::superstructure::ARM_STOW_POSITION,
    hardware::{MotorCommand, MotorOutput},
};

/// The shooter pivot. Holds its target position every loop.
#[derive(Debug)]
pub struct Arm {
    motor: Box<dyn MotorOutput>,
    target: f64,
}

impl Arm {
    pub fn new(motor: Box<dyn MotorOutput>) -> Self {
        Self {
            motor,
            target: ARM_STOW_POSITION,
        }
    }

    /// Target position in mechanism rotations.
    pub fn set_target(&mut self, rotations: f64) {
        self.target = rotations;
    }

    pub fn stow(&mut self) {
        self.set_target(ARM_STOW_POSITION);
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Subsystem for Arm {
    fn periodic(&mut self) -> Result {
        self.motor.set(MotorCommand::Position(self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::sim::SimMotor;

    #[test]
    fn holds_target_each_periodic() {
        let motor = SimMotor::new();
        let mut arm = Arm::new(Box::new(motor.clone()));

        arm.periodic().unwrap();
        assert_eq!(motor.command(), MotorCommand::Position(ARM_STOW_POSITION));

        arm.set_target(0.25);
        arm.periodic().unwrap();
        assert_eq!(motor.command(), MotorCommand::Position(0.25));

        arm.stow();
        arm.periodic().unwrap();
        assert_eq!(motor.count(MotorCommand::Position(ARM_STOW_POSITION)), 2);
    }
}
