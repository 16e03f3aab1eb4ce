use alloc::{boxed::Box, vec::Vec};

use crate::Result;

/// Bindings polled once per scheduler run, before any command executes.
#[derive(Default)]
pub struct EventLoop {
    events: Vec<Box<dyn FnMut() -> Result>>,
}

impl EventLoop {
    /// Add an event to run when the loop is polled.
    pub fn bind(&mut self, action: impl FnMut() -> Result + 'static) {
        self.events.push(Box::new(action));
    }

    /// Runs every bound event in binding order, stopping at the first failure.
    pub fn poll(&mut self) -> Result {
        for event in self.events.iter_mut() {
            event()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
