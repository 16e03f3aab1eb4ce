use alloc::string::String;

use snafu::Snafu;

/// Errors raised while running commands or wiring up the robot.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Device fault on {device}: {message}"))]
    Device {
        device: &'static str,
        message: String,
    },
    #[snafu(display("A routine named {name:?} is already registered."))]
    DuplicateRoutine { name: String },
    #[snafu(display("No routine named {name:?} is registered."))]
    UnknownRoutine { name: String },
    #[snafu(transparent)]
    DefaultCommand { source: SetDefaultCommandError },
}

#[derive(Debug, Snafu)]
pub enum SetDefaultCommandError {
    #[snafu(display("Default commands must require their subsystem."))]
    MustRequireSubsystem,
    #[snafu(display("Cannot set the default command on a subsystem that is not registered."))]
    NotRegistered,
}

pub type Result<T = (), E = Error> = core::result::Result<T, E>;
