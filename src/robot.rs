use core::time::Duration;

use tracing::info;

use crate::Result;

/// Returns true if the code is running on a real robot and not in simulation.
pub const fn is_real() -> bool {
    cfg!(target_os = "vexos")
}

/// Returns true if the code is running in simulation and not on a real robot.
pub const fn is_sim() -> bool {
    !is_real()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionMode {
    Disabled,
    Autonomous,
    Opcontrol,
}

pub trait ScheduledRobot {
    fn periodic(&mut self) -> Result {
        Ok(())
    }
    fn sim_periodic(&mut self) -> Result {
        Ok(())
    }
    fn disabled_init(&mut self) -> Result {
        Ok(())
    }
    fn disabled_periodic(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_init(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_periodic(&mut self) -> Result {
        Ok(())
    }
    fn opcontrol_init(&mut self) -> Result {
        Ok(())
    }
    fn opcontrol_periodic(&mut self) -> Result {
        Ok(())
    }
}

pub const ITERATION_PERIOD: Duration = Duration::from_millis(20);

/// Dispatches one loop iteration at a time to a [`ScheduledRobot`], calling the matching
/// `*_init` hook whenever the competition mode changes.
pub struct RobotLoop<R> {
    robot: R,
    previous_mode: Option<CompetitionMode>,
}

impl<R: ScheduledRobot> RobotLoop<R> {
    pub fn new(robot: R) -> Self {
        Self {
            robot,
            previous_mode: None,
        }
    }

    pub fn step(&mut self, current_mode: CompetitionMode) -> Result {
        let entered = self.previous_mode != Some(current_mode);
        if entered {
            info!(mode = ?current_mode, "entering competition mode");
        }

        match current_mode {
            CompetitionMode::Disabled => {
                if entered {
                    self.robot.disabled_init()?;
                }
                self.robot.disabled_periodic()?;
            }
            CompetitionMode::Autonomous => {
                if entered {
                    self.robot.autonomous_init()?;
                }
                self.robot.autonomous_periodic()?;
            }
            CompetitionMode::Opcontrol => {
                if entered {
                    self.robot.opcontrol_init()?;
                }
                self.robot.opcontrol_periodic()?;
            }
        }
        self.previous_mode = Some(current_mode);

        self.robot.periodic()?;
        if is_sim() {
            self.robot.sim_periodic()?;
        }
        Ok(())
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }
}

/// Runs `robot` forever at [`ITERATION_PERIOD`], following the field's competition mode.
#[cfg(target_os = "vexos")]
pub fn start_robot(robot: impl ScheduledRobot) -> Result {
    use pros::core::task::Interval;
    use pros::devices::competition;

    let mut robot_loop = RobotLoop::new(robot);
    let mut interval = Interval::start();

    loop {
        let mode = match competition::mode() {
            competition::CompetitionMode::Disabled => CompetitionMode::Disabled,
            competition::CompetitionMode::Autonomous => CompetitionMode::Autonomous,
            competition::CompetitionMode::Opcontrol => CompetitionMode::Opcontrol,
        };
        robot_loop.step(mode)?;
        interval.delay(ITERATION_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl ScheduledRobot for Recorder {
        fn periodic(&mut self) -> Result {
            self.0.push("periodic");
            Ok(())
        }
        fn disabled_init(&mut self) -> Result {
            self.0.push("disabled_init");
            Ok(())
        }
        fn autonomous_init(&mut self) -> Result {
            self.0.push("autonomous_init");
            Ok(())
        }
        fn autonomous_periodic(&mut self) -> Result {
            self.0.push("autonomous_periodic");
            Ok(())
        }
    }

    #[test]
    fn init_hooks_run_once_per_mode_change() {
        let mut robot_loop = RobotLoop::new(Recorder::default());
        robot_loop.step(CompetitionMode::Disabled).unwrap();
        robot_loop.step(CompetitionMode::Autonomous).unwrap();
        robot_loop.step(CompetitionMode::Autonomous).unwrap();

        assert_eq!(
            robot_loop.robot().0,
            [
                "disabled_init",
                "periodic",
                "autonomous_init",
                "autonomous_periodic",
                "periodic",
                "autonomous_periodic",
                "periodic",
            ]
        );
    }

    #[test]
    fn host_builds_are_simulation() {
        assert!(is_sim());
        assert!(!is_real());
    }
}
