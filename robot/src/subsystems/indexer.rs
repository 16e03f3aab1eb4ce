use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};

use crate::{
    constants::superstructure::{INDEXER_FEED_SPEED, INDEXER_PASS_SPEED, INDEXER_REVERSE_SPEED},
    hardware::{DigitalInput, MotorOutput},
};

/// Holds a note between the intake and the shooter. A beam break reports whether a note
/// is seated.
#[derive(Debug)]
pub struct Indexer {
    motor: Box<dyn MotorOutput>,
    note_sensor: Box<dyn DigitalInput>,
    speed: f64,
}

impl Indexer {
    pub fn new(motor: Box<dyn MotorOutput>, note_sensor: Box<dyn DigitalInput>) -> Self {
        Self {
            motor,
            note_sensor,
            speed: 0.0,
        }
    }

    fn drive(&mut self, speed: f64) -> Result {
        self.speed = speed;
        self.motor.set_percent(speed)
    }

    /// Slowly draws a note in from the intake.
    pub fn feed(&mut self) -> Result {
        self.drive(INDEXER_FEED_SPEED)
    }

    /// Pushes the held note into the shooter.
    pub fn pass(&mut self) -> Result {
        self.drive(INDEXER_PASS_SPEED)
    }

    pub fn reverse_indexer(&mut self) -> Result {
        self.drive(INDEXER_REVERSE_SPEED)
    }

    pub fn stop_indexer(&mut self) -> Result {
        self.speed = 0.0;
        self.motor.stop()
    }

    pub fn has_note(&self) -> bool {
        self.note_sensor.get()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Subsystem for Indexer {}
