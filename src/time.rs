use alloc::rc::Rc;
use core::{cell::Cell, fmt::Debug, time::Duration};

/// A monotonic time source. Timestamps are measured from an arbitrary epoch.
pub trait Clock: Debug {
    fn now(&self) -> Duration;
}

/// A clock that only moves when told to. Used by simulation and tests to step time
/// in whole scheduler iterations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// The robot brain's uptime clock.
#[cfg(target_os = "vexos")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: pros::core::time::Instant,
}

#[cfg(target_os = "vexos")]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: pros::core::time::Instant::now(),
        }
    }
}

#[cfg(target_os = "vexos")]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        assert_eq!(clock.now(), Duration::ZERO);

        shared.advance(Duration::from_millis(20));
        shared.advance(Duration::from_millis(20));
        assert_eq!(clock.now(), Duration::from_millis(40));

        clock.set(Duration::from_secs(3));
        assert_eq!(shared.now(), Duration::from_secs(3));
    }
}
