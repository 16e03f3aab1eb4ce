//! Simulated devices. Each handle is cheap to clone and shares its state with the boxed
//! copy handed to the robot, so tests and the simulation loop can watch and poke devices.

use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::cell::{Cell, RefCell};

use bio_command::{controller::SimController, time::Clock, time::ManualClock, Result};

use super::{
    Color, DigitalInput, Hardware, LedStrip, MotorCommand, MotorOutput, SwerveDrive,
    SwerveDriveState,
};
use crate::{
    constants::{swerve::DRIVETRAIN, DrivetrainConfig},
    drive::{ChassisSpeeds, Pose2d, SwerveRequest},
};

#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    history: Rc<RefCell<Vec<MotorCommand>>>,
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&self) -> MotorCommand {
        self.history.borrow().last().copied().unwrap_or_default()
    }

    pub fn percent(&self) -> f64 {
        match self.command() {
            MotorCommand::Percent(output) => output,
            _ => 0.0,
        }
    }

    /// How many times the motor was commanded to `command`.
    pub fn count(&self, command: MotorCommand) -> usize {
        self.history.borrow().iter().filter(|c| **c == command).count()
    }

    pub fn history(&self) -> Vec<MotorCommand> {
        self.history.borrow().clone()
    }
}

impl MotorOutput for SimMotor {
    fn set(&mut self, command: MotorCommand) -> Result {
        self.history.borrow_mut().push(command);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimDigitalInput {
    value: Rc<Cell<bool>>,
}

impl SimDigitalInput {
    pub fn set(&self, value: bool) {
        self.value.set(value);
    }
}

impl DigitalInput for SimDigitalInput {
    fn get(&self) -> bool {
        self.value.get()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimLedStrip {
    color: Rc<Cell<Color>>,
}

impl SimLedStrip {
    pub fn color(&self) -> Color {
        self.color.get()
    }
}

impl LedStrip for SimLedStrip {
    fn set_color(&mut self, color: Color) -> Result {
        self.color.set(color);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SimSwerveState {
    last_request: SwerveRequest,
    drive: SwerveDriveState,
    requests: usize,
}

/// Records requests and seeds; does not move.
#[derive(Debug, Clone)]
pub struct SimSwerveDrive {
    config: DrivetrainConfig,
    clock: Rc<dyn Clock>,
    state: Rc<RefCell<SimSwerveState>>,
}

impl SimSwerveDrive {
    pub fn new(config: &DrivetrainConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            config: *config,
            clock,
            state: Rc::default(),
        }
    }

    /// Another handle on the same drivetrain, timed by `clock`.
    fn with_clock(&self, clock: Rc<dyn Clock>) -> Self {
        Self {
            config: self.config,
            clock,
            state: self.state.clone(),
        }
    }

    pub fn last_request(&self) -> SwerveRequest {
        self.state.borrow().last_request
    }

    /// Number of requests applied so far.
    pub fn requests(&self) -> usize {
        self.state.borrow().requests
    }

    pub fn pose(&self) -> Pose2d {
        self.state.borrow().drive.pose
    }
}

impl SwerveDrive for SimSwerveDrive {
    fn set_control(&mut self, request: &SwerveRequest) -> Result {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        state.last_request = *request;
        state.requests += 1;
        state.drive.speeds = match request {
            SwerveRequest::Idle => ChassisSpeeds::default(),
            SwerveRequest::FieldCentric(speeds) => *speeds,
        };
        state.drive.odometry_period = now.saturating_sub(state.drive.timestamp);
        state.drive.timestamp = now;
        Ok(())
    }

    fn seed_field_relative(&mut self, pose: Pose2d) -> Result {
        self.state.borrow_mut().drive.pose = pose;
        Ok(())
    }

    fn state(&self) -> SwerveDriveState {
        self.state.borrow().drive
    }

    fn config(&self) -> &DrivetrainConfig {
        &self.config
    }
}

/// A full set of simulated devices on a hand-stepped clock.
#[derive(Debug, Clone)]
pub struct SimHardware {
    /// Reported to the robot as [`Hardware::simulation`]. Clear it to run the robot as
    /// it would on the field.
    pub simulation: bool,
    pub clock: ManualClock,
    pub driver: SimController,
    pub codriver: SimController,
    pub swerve: SimSwerveDrive,
    pub intake: SimMotor,
    pub indexer: SimMotor,
    pub note_sensor: SimDigitalInput,
    pub shooter_top: SimMotor,
    pub shooter_bottom: SimMotor,
    pub arm: SimMotor,
    pub hanger: SimMotor,
    pub led: SimLedStrip,
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHardware {
    pub fn new() -> Self {
        Self::with_config(&DRIVETRAIN)
    }

    pub fn with_config(config: &DrivetrainConfig) -> Self {
        let clock = ManualClock::new();
        Self {
            simulation: true,
            swerve: SimSwerveDrive::new(config, Rc::new(clock.clone())),
            clock,
            driver: SimController::new(),
            codriver: SimController::new(),
            intake: SimMotor::new(),
            indexer: SimMotor::new(),
            note_sensor: SimDigitalInput::default(),
            shooter_top: SimMotor::new(),
            shooter_bottom: SimMotor::new(),
            arm: SimMotor::new(),
            hanger: SimMotor::new(),
            led: SimLedStrip::default(),
        }
    }

    /// The devices as the robot sees them, sharing state with these handles.
    pub fn hardware(&self) -> Hardware {
        self.hardware_with_clock(Rc::new(self.clock.clone()))
    }

    /// Like [`SimHardware::hardware`], but timing commands with another clock.
    pub fn hardware_with_clock(&self, clock: Rc<dyn Clock>) -> Hardware {
        Hardware {
            simulation: self.simulation,
            swerve: Box::new(self.swerve.with_clock(clock.clone())),
            clock,
            driver: Rc::new(self.driver.clone()),
            codriver: Rc::new(self.codriver.clone()),
            intake: Box::new(self.intake.clone()),
            indexer: Box::new(self.indexer.clone()),
            note_sensor: Box::new(self.note_sensor.clone()),
            shooter_top: Box::new(self.shooter_top.clone()),
            shooter_bottom: Box::new(self.shooter_bottom.clone()),
            arm: Box::new(self.arm.clone()),
            hanger: Box::new(self.hanger.clone()),
            led: Box::new(self.led.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;

    #[test]
    fn motor_handles_share_history() {
        let motor = SimMotor::new();
        let mut boxed: Box<dyn MotorOutput> = Box::new(motor.clone());
        boxed.set_percent(1.5).unwrap();
        boxed.stop().unwrap();

        assert_eq!(
            motor.history(),
            [MotorCommand::Percent(1.0), MotorCommand::Percent(0.0)]
        );
        assert_eq!(motor.count(MotorCommand::Percent(0.0)), 1);
        assert_eq!(motor.percent(), 0.0);
    }

    #[test]
    fn swerve_reports_commanded_speeds_and_update_period() {
        let sim = SimHardware::new();
        let mut hardware = sim.hardware();
        let speeds = ChassisSpeeds {
            forward: 1.0,
            strafe: 0.0,
            rotation: 0.5,
        };

        sim.clock.advance(Duration::from_millis(20));
        hardware.swerve.set_control(&SwerveRequest::Idle).unwrap();
        sim.clock.advance(Duration::from_millis(20));
        hardware
            .swerve
            .set_control(&SwerveRequest::FieldCentric(speeds))
            .unwrap();

        let state = sim.swerve.state();
        assert_eq!(state.speeds, speeds);
        assert_eq!(state.timestamp, Duration::from_millis(40));
        assert_eq!(state.odometry_period, Duration::from_millis(20));
        assert_eq!(sim.swerve.requests(), 2);
    }

    #[test]
    fn swerve_handle_carries_its_config() {
        let mut config = DRIVETRAIN;
        config.drive_gear_ratio = 5.9;
        config.modules[0].encoder_offset = 0.125;

        let sim = SimHardware::with_config(&config);
        let hardware = sim.hardware();

        assert_eq!(hardware.swerve.config().drive_gear_ratio, 5.9);
        assert_eq!(hardware.swerve.config().modules[0].encoder_offset, 0.125);
        assert_eq!(sim.swerve.config(), &config);
        assert_eq!(sim.hardware().swerve.config(), &config);
    }
}
