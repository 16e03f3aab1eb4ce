//! Operator-driven swerve requests.

use core::f64::consts::PI;

use crate::constants::{drive::DEADBAND_FRACTION, DrivetrainConfig};

/// Field position in meters, heading in radians (counter-clockwise positive).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose2d {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    pub fn with_heading_degrees(self, degrees: f64) -> Self {
        Self {
            heading: degrees * PI / 180.0,
            ..self
        }
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading * 180.0 / PI
    }
}

/// Velocities relative to the field: `forward` and `strafe` in m/s, `rotation` in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    pub forward: f64,
    pub strafe: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SwerveRequest {
    /// Leave the modules where they are and apply no output.
    #[default]
    Idle,
    /// Drive relative to the field, driving open loop.
    FieldCentric(ChassisSpeeds),
}

/// Joystick scaling for the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveLimits {
    pub max_speed: f64,
    pub max_angular_rate: f64,
    pub deadband_fraction: f64,
}

impl DriveLimits {
    pub const fn from_config(config: &DrivetrainConfig) -> Self {
        Self {
            max_speed: config.max_speed,
            max_angular_rate: config.max_angular_rate,
            deadband_fraction: DEADBAND_FRACTION,
        }
    }

    /// Builds a field-centric request from raw stick deflection.
    ///
    /// Pushing the left stick away (negative Y) drives forward, pushing it left (negative
    /// X) strafes left, and pushing the right stick left (negative X) turns
    /// counter-clockwise. Each axis is zeroed while below the deadband.
    pub fn field_centric(&self, left_x: f64, left_y: f64, right_x: f64) -> SwerveRequest {
        let speed_deadband = self.max_speed * self.deadband_fraction;
        let rotation_deadband = self.max_angular_rate * self.deadband_fraction;

        SwerveRequest::FieldCentric(ChassisSpeeds {
            forward: deadband(-left_y * self.max_speed, speed_deadband),
            strafe: deadband(-left_x * self.max_speed, speed_deadband),
            rotation: deadband(-right_x * self.max_angular_rate, rotation_deadband),
        })
    }
}

/// Zero when `value` lies strictly within `threshold` of zero, `value` otherwise.
pub fn deadband(value: f64, threshold: f64) -> f64 {
    if value > -threshold && value < threshold {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::swerve::DRIVETRAIN;

    fn speeds(request: SwerveRequest) -> ChassisSpeeds {
        match request {
            SwerveRequest::FieldCentric(speeds) => speeds,
            SwerveRequest::Idle => panic!("expected a field-centric request"),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b) * (a - b) < 1e-18
    }

    #[test]
    fn small_deflections_are_zeroed_per_axis() {
        let limits = DriveLimits::from_config(&DRIVETRAIN);
        let request = speeds(limits.field_centric(0.09, -0.099, 0.05));
        assert_eq!(request, ChassisSpeeds::default());

        // A large deflection on one axis does not lift the others out of the deadband.
        let request = speeds(limits.field_centric(0.09, -1.0, -0.09));
        assert_eq!(request.strafe, 0.0);
        assert_eq!(request.rotation, 0.0);
        assert!(close(request.forward, DRIVETRAIN.max_speed));
    }

    #[test]
    fn output_scales_linearly_past_the_deadband() {
        let limits = DriveLimits::from_config(&DRIVETRAIN);
        for input in [0.11, 0.25, 0.5, 0.75, 1.0] {
            let request = speeds(limits.field_centric(-input, -input, -input));
            assert!(close(request.forward, input * limits.max_speed));
            assert!(close(request.strafe, input * limits.max_speed));
            assert!(close(request.rotation, input * limits.max_angular_rate));
        }
    }

    #[test]
    fn stick_signs_are_flipped() {
        let limits = DriveLimits::from_config(&DRIVETRAIN);
        let request = speeds(limits.field_centric(0.5, 0.5, 0.5));
        assert!(request.forward < 0.0);
        assert!(request.strafe < 0.0);
        assert!(request.rotation < 0.0);
    }

    #[test]
    fn deadband_threshold_itself_passes_through() {
        assert_eq!(deadband(0.5, 0.5), 0.5);
        assert_eq!(deadband(-0.5, 0.5), -0.5);
        assert_eq!(deadband(0.4999, 0.5), 0.0);
    }

    #[test]
    fn heading_degrees_round_trip() {
        let pose = Pose2d::default().with_heading_degrees(90.0);
        assert!(close(pose.heading, PI / 2.0));
        assert!(close(pose.heading_degrees(), 90.0));
    }
}
