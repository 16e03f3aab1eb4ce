use alloc::boxed::Box;
use core::fmt::{self, Debug, Formatter};

use bio_command::{subsystem::Subsystem, Result};
use tracing::info;

use crate::{
    constants::{ConfigError, DrivetrainConfig},
    drive::{DriveLimits, Pose2d, SwerveRequest},
    hardware::{SwerveDrive, SwerveDriveState},
};

type TelemetryFn = Box<dyn FnMut(&SwerveDriveState)>;

/// The swerve drivetrain. Module control and odometry live in the [`SwerveDrive`]; this
/// wraps it with the operator limits and an optional telemetry sink.
pub struct Drivetrain {
    swerve: Box<dyn SwerveDrive>,
    limits: DriveLimits,
    telemetry: Option<TelemetryFn>,
}

impl Drivetrain {
    /// Checks the constants the swerve was built from and takes the operator limits from
    /// them.
    pub fn new(swerve: Box<dyn SwerveDrive>) -> Result<Self, ConfigError> {
        let config = swerve.config();
        config.validate()?;
        let limits = DriveLimits::from_config(config);
        Ok(Self {
            swerve,
            limits,
            telemetry: None,
        })
    }

    pub fn set_control(&mut self, request: &SwerveRequest) -> Result {
        self.swerve.set_control(request)
    }

    /// Makes the direction the robot currently faces the field's forward.
    pub fn seed_field_relative(&mut self) -> Result {
        let pose = self.swerve.state().pose;
        self.seed_field_relative_to(Pose2d { heading: 0.0, ..pose })
    }

    pub fn seed_field_relative_to(&mut self, pose: Pose2d) -> Result {
        info!(x = pose.x, y = pose.y, heading = pose.heading_degrees(), "seeding field-relative pose");
        self.swerve.seed_field_relative(pose)
    }

    /// Called with the drive state on every periodic. Replaces any earlier sink.
    pub fn register_telemetry(&mut self, telemetry: impl FnMut(&SwerveDriveState) + 'static) {
        self.telemetry = Some(Box::new(telemetry));
    }

    pub fn state(&self) -> SwerveDriveState {
        self.swerve.state()
    }

    pub fn limits(&self) -> DriveLimits {
        self.limits
    }

    pub fn config(&self) -> &DrivetrainConfig {
        self.swerve.config()
    }
}

impl Debug for Drivetrain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drivetrain")
            .field("swerve", &self.swerve)
            .field("limits", &self.limits)
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

impl Subsystem for Drivetrain {
    fn periodic(&mut self) -> Result {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry(&self.swerve.state());
        }
        Ok(())
    }
}
