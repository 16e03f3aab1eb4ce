//! Device seams. The robot only ever talks to hardware through these traits; the vendor
//! libraries (or [`sim`]) provide the implementations.

use alloc::{boxed::Box, rc::Rc};
use core::{fmt::Debug, time::Duration};

use bio_command::{controller::ControllerInput, time::Clock, Result};

use crate::{
    constants::DrivetrainConfig,
    drive::{ChassisSpeeds, Pose2d, SwerveRequest},
};

pub mod sim;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotorCommand {
    /// Open-loop output in `[-1, 1]`.
    Percent(f64),
    /// Closed-loop position target, in mechanism rotations.
    Position(f64),
    #[default]
    Neutral,
}

pub trait MotorOutput: Debug {
    fn set(&mut self, command: MotorCommand) -> Result;

    fn set_percent(&mut self, output: f64) -> Result {
        self.set(MotorCommand::Percent(output.clamp(-1.0, 1.0)))
    }

    fn stop(&mut self) -> Result {
        self.set(MotorCommand::Percent(0.0))
    }
}

pub trait DigitalInput: Debug {
    fn get(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub trait LedStrip: Debug {
    fn set_color(&mut self, color: Color) -> Result;
}

/// What the swerve controller reports once per update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwerveDriveState {
    pub pose: Pose2d,
    pub speeds: ChassisSpeeds,
    /// When the state was sampled.
    pub timestamp: Duration,
    /// Time between the two most recent odometry updates.
    pub odometry_period: Duration,
}

/// The vendor swerve controller: owns module kinematics, closed-loop control and pose
/// estimation.
pub trait SwerveDrive: Debug {
    fn set_control(&mut self, request: &SwerveRequest) -> Result;
    /// Replaces the pose estimate, making `pose.heading` the new field-relative heading.
    fn seed_field_relative(&mut self, pose: Pose2d) -> Result;
    fn state(&self) -> SwerveDriveState;
    /// The constants the modules were built from.
    fn config(&self) -> &DrivetrainConfig;
}

/// Every device the robot uses, handed over at construction.
pub struct Hardware {
    /// Set when the devices are simulated rather than physical.
    pub simulation: bool,
    pub clock: Rc<dyn Clock>,
    pub driver: Rc<dyn ControllerInput>,
    pub codriver: Rc<dyn ControllerInput>,
    pub swerve: Box<dyn SwerveDrive>,
    pub intake: Box<dyn MotorOutput>,
    pub indexer: Box<dyn MotorOutput>,
    pub note_sensor: Box<dyn DigitalInput>,
    pub shooter_top: Box<dyn MotorOutput>,
    pub shooter_bottom: Box<dyn MotorOutput>,
    pub arm: Box<dyn MotorOutput>,
    pub hanger: Box<dyn MotorOutput>,
    pub led: Box<dyn LedStrip>,
}
