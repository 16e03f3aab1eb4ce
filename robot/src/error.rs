use bio_command::SetDefaultCommandError;
use snafu::Snafu;

use crate::constants::ConfigError;

/// Errors raised while building the robot.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid drivetrain configuration: {source}"))]
    Config { source: ConfigError },
    #[snafu(transparent)]
    Command { source: bio_command::Error },
    #[snafu(transparent)]
    DefaultCommand { source: SetDefaultCommandError },
}

pub type Result<T = (), E = Error> = core::result::Result<T, E>;
