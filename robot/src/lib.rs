#![no_std]

extern crate alloc;

pub mod autos;
pub mod commands;
pub mod constants;
pub mod drive;
pub mod error;
pub mod hardware;
pub mod robot;
pub mod subsystems;
pub mod telemetry;

pub use error::{Error, Result};
pub use robot::Robot;
