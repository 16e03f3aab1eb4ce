use alloc::boxed::Box;

use bio_command::{subsystem::Subsystem, Result};

use crate::hardware::{Color, LedStrip};

#[derive(Debug)]
pub struct Led {
    strip: Box<dyn LedStrip>,
    color: Option<Color>,
}

impl Led {
    pub fn new(strip: Box<dyn LedStrip>) -> Self {
        Self { strip, color: None }
    }

    /// Shows `color`, skipping the write if it is already shown.
    pub fn set_color(&mut self, color: Color) -> Result {
        if self.color != Some(color) {
            self.strip.set_color(color)?;
            self.color = Some(color);
        }
        Ok(())
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

impl Subsystem for Led {}
