//! Physical constants for the robot. Everything here is read once, at construction.

use core::f64::consts::PI;

use snafu::{ensure, Snafu};

pub const fn inches_to_meters(inches: f64) -> f64 {
    inches * 0.0254
}

/// Closed-loop gains handed to the motor controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub ks: f64,
    pub kv: f64,
    pub ka: f64,
}

/// One swerve module. Offsets are in encoder turns, positions in meters from the robot
/// centre (+x forward, +y left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleConfig {
    pub name: &'static str,
    pub drive_motor_id: u8,
    pub steer_motor_id: u8,
    pub encoder_id: u8,
    pub encoder_offset: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub invert_drive: bool,
}

/// Values only the simulated drivetrain uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub steer_inertia: f64,
    pub drive_inertia: f64,
    pub steer_friction_voltage: f64,
    pub drive_friction_voltage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivetrainConfig {
    pub gyro_id: u8,
    pub bus_name: &'static str,
    pub drive_gear_ratio: f64,
    pub steer_gear_ratio: f64,
    /// Drive motor turns per turn of the azimuth.
    pub coupling_ratio: f64,
    pub wheel_radius: f64,
    /// Stator current at which the wheels start to slip, in amps.
    pub slip_current: f64,
    pub steer_gains: SlotGains,
    pub drive_gains: SlotGains,
    pub steer_inverted: bool,
    /// Theoretical free speed at 12 V, in m/s.
    pub speed_at_12_volts: f64,
    pub max_speed: f64,
    /// In rad/s.
    pub max_angular_rate: f64,
    pub modules: [ModuleConfig; 4],
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Motor,
    Encoder,
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("{kind:?} ID {id} is bound to more than one device"))]
    DuplicateDeviceId { kind: DeviceKind, id: u8 },
}

impl DrivetrainConfig {
    /// Checks that no device ID is bound twice within a device kind. Drive and steer
    /// motors share one ID space; encoders have their own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let motors = self
            .modules
            .iter()
            .flat_map(|module| [module.drive_motor_id, module.steer_motor_id]);
        ensure_unique(DeviceKind::Motor, motors)?;
        ensure_unique(
            DeviceKind::Encoder,
            self.modules.iter().map(|module| module.encoder_id),
        )
    }
}

fn ensure_unique(kind: DeviceKind, ids: impl Iterator<Item = u8>) -> Result<(), ConfigError> {
    let mut seen = [false; 256];
    for id in ids {
        ensure!(!seen[usize::from(id)], DuplicateDeviceIdSnafu { kind, id });
        seen[usize::from(id)] = true;
    }
    Ok(())
}

pub mod swerve {
    use super::*;

    const MODULE_OFFSET: f64 = inches_to_meters(10.375);

    pub const STEER_GAINS: SlotGains = SlotGains {
        kp: 100.0,
        ki: 0.0,
        kd: 0.2,
        ks: 0.0,
        kv: 1.5,
        ka: 0.0,
    };

    pub const DRIVE_GAINS: SlotGains = SlotGains {
        kp: 3.0,
        ki: 0.0,
        kd: 0.0,
        ks: 0.0,
        kv: 0.0,
        ka: 0.0,
    };

    pub const SPEED_AT_12_VOLTS: f64 = 5.96;
    pub const MAX_ANGULAR_RATE: f64 = 4.0 * PI;

    const INVERT_LEFT_SIDE: bool = true;
    const INVERT_RIGHT_SIDE: bool = false;

    pub const FRONT_LEFT: ModuleConfig = ModuleConfig {
        name: "front left",
        drive_motor_id: 3,
        steer_motor_id: 4,
        encoder_id: 2,
        encoder_offset: -0.421875,
        position_x: MODULE_OFFSET,
        position_y: MODULE_OFFSET,
        invert_drive: INVERT_LEFT_SIDE,
    };

    pub const FRONT_RIGHT: ModuleConfig = ModuleConfig {
        name: "front right",
        drive_motor_id: 1,
        steer_motor_id: 2,
        encoder_id: 1,
        encoder_offset: -0.472412109375,
        position_x: MODULE_OFFSET,
        position_y: -MODULE_OFFSET,
        invert_drive: INVERT_RIGHT_SIDE,
    };

    pub const BACK_LEFT: ModuleConfig = ModuleConfig {
        name: "back left",
        drive_motor_id: 5,
        steer_motor_id: 6,
        encoder_id: 3,
        encoder_offset: 0.435302734375,
        position_x: -MODULE_OFFSET,
        position_y: MODULE_OFFSET,
        invert_drive: INVERT_LEFT_SIDE,
    };

    pub const BACK_RIGHT: ModuleConfig = ModuleConfig {
        name: "back right",
        drive_motor_id: 7,
        steer_motor_id: 8,
        encoder_id: 4,
        encoder_offset: -0.0185546875,
        position_x: -MODULE_OFFSET,
        position_y: -MODULE_OFFSET,
        invert_drive: INVERT_RIGHT_SIDE,
    };

    pub const DRIVETRAIN: DrivetrainConfig = DrivetrainConfig {
        gyro_id: 0,
        bus_name: "canivore2",
        drive_gear_ratio: 5.357142857142857,
        steer_gear_ratio: 21.428571428571427,
        coupling_ratio: 3.125,
        wheel_radius: inches_to_meters(2.0),
        slip_current: 80.0,
        steer_gains: STEER_GAINS,
        drive_gains: DRIVE_GAINS,
        steer_inverted: true,
        speed_at_12_volts: SPEED_AT_12_VOLTS,
        max_speed: SPEED_AT_12_VOLTS,
        max_angular_rate: MAX_ANGULAR_RATE,
        modules: [FRONT_LEFT, FRONT_RIGHT, BACK_LEFT, BACK_RIGHT],
        simulation: SimulationConfig {
            steer_inertia: 0.00001,
            drive_inertia: 0.001,
            steer_friction_voltage: 0.25,
            drive_friction_voltage: 0.25,
        },
    };
}

pub mod drive {
    /// Fraction of the maximum rate below which a commanded axis is zeroed.
    pub const DEADBAND_FRACTION: f64 = 0.1;
    /// Heading seeded into the pose estimate when the simulation starts, in degrees.
    pub const SIM_START_HEADING_DEGREES: f64 = 90.0;
}

/// Open-loop outputs in `[-1, 1]` for the superstructure.
pub mod superstructure {
    pub const INTAKE_SPEED: f64 = 0.8;
    pub const OUTTAKE_SPEED: f64 = -0.6;

    pub const INDEXER_FEED_SPEED: f64 = 0.35;
    pub const INDEXER_PASS_SPEED: f64 = 1.0;
    pub const INDEXER_REVERSE_SPEED: f64 = -0.5;

    pub const SHOOTER_SPEAKER_SPEED: f64 = 0.9;
    pub const SHOOTER_AMP_SPEED: f64 = 0.25;

    pub const HANGER_EXTEND_SPEED: f64 = 1.0;
    pub const HANGER_RETRACT_SPEED: f64 = -1.0;

    /// Arm stow position, in mechanism rotations.
    pub const ARM_STOW_POSITION: f64 = 0.0;
}

pub mod dashboard {
    pub const AUTO_CHOOSER_KEY: &str = "Auto Mode";
}

#[cfg(test)]
mod tests {
    use super::{swerve::DRIVETRAIN, *};

    #[test]
    fn module_device_ids_are_pairwise_distinct() {
        DRIVETRAIN.validate().unwrap();

        let modules = &DRIVETRAIN.modules;
        for (i, a) in modules.iter().enumerate() {
            assert_ne!(a.drive_motor_id, a.steer_motor_id, "{}", a.name);
            for b in &modules[i + 1..] {
                assert_ne!(a.drive_motor_id, b.drive_motor_id);
                assert_ne!(a.steer_motor_id, b.steer_motor_id);
                assert_ne!(a.drive_motor_id, b.steer_motor_id);
                assert_ne!(a.steer_motor_id, b.drive_motor_id);
                assert_ne!(a.encoder_id, b.encoder_id);
            }
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut config = DRIVETRAIN;
        config.modules[3].steer_motor_id = config.modules[0].drive_motor_id;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDeviceId { kind: DeviceKind::Motor, id: 3 })
        ));

        let mut config = DRIVETRAIN;
        config.modules[1].encoder_id = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDeviceId { kind: DeviceKind::Encoder, id: 4 })
        ));
    }

    #[test]
    fn modules_sit_on_a_square() {
        let offset = inches_to_meters(10.375);
        let signs = DRIVETRAIN
            .modules
            .map(|m| (m.position_x == offset, m.position_y == offset));
        assert_eq!(signs, [(true, true), (true, false), (false, true), (false, false)]);
        assert!(DRIVETRAIN
            .modules
            .iter()
            .all(|m| m.position_x == offset || m.position_x == -offset));
    }
}
