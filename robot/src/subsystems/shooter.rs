use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};
use tracing::debug;

use crate::{
    constants::superstructure::{SHOOTER_AMP_SPEED, SHOOTER_SPEAKER_SPEED},
    hardware::MotorOutput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShooterState {
    #[default]
    Idle,
    /// Full speed, for the speaker.
    Speaker,
    Amp,
}

/// Two flywheels, top and bottom, always driven together.
#[derive(Debug)]
pub struct Shooter {
    top: Box<dyn MotorOutput>,
    bottom: Box<dyn MotorOutput>,
    state: ShooterState,
}

impl Shooter {
    pub fn new(top: Box<dyn MotorOutput>, bottom: Box<dyn MotorOutput>) -> Self {
        Self {
            top,
            bottom,
            state: ShooterState::Idle,
        }
    }

    fn drive(&mut self, state: ShooterState, speed: f64) -> Result {
        if self.state != state {
            debug!(?state, "shooter state changed");
        }
        self.state = state;
        self.top.set_percent(speed)?;
        self.bottom.set_percent(speed)
    }

    pub fn spin_up(&mut self) -> Result {
        self.drive(ShooterState::Speaker, SHOOTER_SPEAKER_SPEED)
    }

    pub fn amp_shot(&mut self) -> Result {
        self.drive(ShooterState::Amp, SHOOTER_AMP_SPEED)
    }

    pub fn stop_shooter(&mut self) -> Result {
        self.drive(ShooterState::Idle, 0.0)
    }

    /// Whether the flywheels have been told to spin.
    pub fn is_shooting(&self) -> bool {
        self.state != ShooterState::Idle
    }

    pub fn state(&self) -> ShooterState {
        self.state
    }
}

impl Subsystem for Shooter {}
