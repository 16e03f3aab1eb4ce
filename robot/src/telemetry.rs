//! Drivetrain state published to the dashboard.

use bio_command::dashboard::Dashboard;

use crate::hardware::SwerveDriveState;

pub const POSE_X: &str = "Drive/Pose X";
pub const POSE_Y: &str = "Drive/Pose Y";
pub const HEADING: &str = "Drive/Heading";
pub const VELOCITY_X: &str = "Drive/Velocity X";
pub const VELOCITY_Y: &str = "Drive/Velocity Y";
pub const ROTATION_RATE: &str = "Drive/Rotation Rate";
/// Commanded translation as a fraction of the maximum speed, per axis.
pub const SPEED_FRACTION_X: &str = "Drive/Speed Fraction X";
pub const SPEED_FRACTION_Y: &str = "Drive/Speed Fraction Y";
pub const ODOMETRY_PERIOD: &str = "Drive/Odometry Period";
pub const ODOMETRY_FREQUENCY: &str = "Drive/Odometry Frequency";

#[derive(Debug, Clone)]
pub struct Telemetry {
    max_speed: f64,
    dashboard: Dashboard,
}

impl Telemetry {
    /// `max_speed` in m/s scales the speed fractions.
    pub fn new(max_speed: f64, dashboard: &Dashboard) -> Self {
        Self {
            max_speed,
            dashboard: dashboard.clone(),
        }
    }

    pub fn telemeterize(&self, state: &SwerveDriveState) {
        let dashboard = &self.dashboard;
        dashboard.put_number(POSE_X, state.pose.x);
        dashboard.put_number(POSE_Y, state.pose.y);
        dashboard.put_number(HEADING, state.pose.heading_degrees());

        dashboard.put_number(VELOCITY_X, state.speeds.forward);
        dashboard.put_number(VELOCITY_Y, state.speeds.strafe);
        dashboard.put_number(ROTATION_RATE, state.speeds.rotation);
        if self.max_speed > 0.0 {
            dashboard.put_number(SPEED_FRACTION_X, state.speeds.forward / self.max_speed);
            dashboard.put_number(SPEED_FRACTION_Y, state.speeds.strafe / self.max_speed);
        }

        let period = state.odometry_period.as_secs_f64();
        dashboard.put_number(ODOMETRY_PERIOD, period);
        if period > 0.0 {
            dashboard.put_number(ODOMETRY_FREQUENCY, 1.0 / period);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::drive::{ChassisSpeeds, Pose2d};

    #[test]
    fn publishes_pose_speeds_and_period() {
        let dashboard = Dashboard::new();
        let telemetry = Telemetry::new(4.0, &dashboard);
        telemetry.telemeterize(&SwerveDriveState {
            pose: Pose2d::new(1.5, -2.0, 0.0),
            speeds: ChassisSpeeds {
                forward: 2.0,
                strafe: -1.0,
                rotation: 0.5,
            },
            timestamp: Duration::from_secs(1),
            odometry_period: Duration::from_millis(250),
        });

        assert_eq!(dashboard.number(POSE_X), Some(1.5));
        assert_eq!(dashboard.number(POSE_Y), Some(-2.0));
        assert_eq!(dashboard.number(HEADING), Some(0.0));
        assert_eq!(dashboard.number(SPEED_FRACTION_X), Some(0.5));
        assert_eq!(dashboard.number(SPEED_FRACTION_Y), Some(-0.25));
        assert_eq!(dashboard.number(ROTATION_RATE), Some(0.5));
        assert_eq!(dashboard.number(ODOMETRY_PERIOD), Some(0.25));
        assert_eq!(dashboard.number(ODOMETRY_FREQUENCY), Some(4.0));
    }

    #[test]
    fn zero_period_publishes_no_frequency() {
        let dashboard = Dashboard::new();
        Telemetry::new(4.0, &dashboard).telemeterize(&SwerveDriveState::default());
        assert_eq!(dashboard.number(ODOMETRY_PERIOD), Some(0.0));
        assert_eq!(dashboard.number(ODOMETRY_FREQUENCY), None);
    }
}
