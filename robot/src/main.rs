//! Desktop simulation: the full robot program on simulated hardware, stepped at the real
//! loop rate through a short match.

use std::{
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use beta_swerve::{hardware::sim::SimHardware, Robot};
use bio_command::{
    robot::{CompetitionMode, RobotLoop, ITERATION_PERIOD},
    time::Clock,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

const DISABLED_TIME: Duration = Duration::from_secs(1);
const AUTONOMOUS_TIME: Duration = Duration::from_secs(15);
const OPCONTROL_TIME: Duration = Duration::from_secs(135);

/// Wall-clock time since the simulation started.
#[derive(Debug)]
struct WallClock {
    epoch: Instant,
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

fn mode_at(elapsed: Duration) -> Option<CompetitionMode> {
    if elapsed < DISABLED_TIME {
        Some(CompetitionMode::Disabled)
    } else if elapsed < DISABLED_TIME + AUTONOMOUS_TIME {
        Some(CompetitionMode::Autonomous)
    } else if elapsed < DISABLED_TIME + AUTONOMOUS_TIME + OPCONTROL_TIME {
        Some(CompetitionMode::Opcontrol)
    } else {
        None
    }
}

fn run() -> beta_swerve::Result {
    let clock = Rc::new(WallClock {
        epoch: Instant::now(),
    });
    let sim = SimHardware::new();
    let robot = Robot::new(sim.hardware_with_clock(clock.clone()))?;
    robot.auto_chooser().select(beta_swerve::autos::SHOOT)?;

    let mut robot_loop = RobotLoop::new(robot);
    let mut next = Instant::now();
    while let Some(mode) = mode_at(clock.now()) {
        robot_loop.step(mode)?;
        next += ITERATION_PERIOD;
        thread::sleep(next.saturating_duration_since(Instant::now()));
    }

    info!(pose = ?sim.swerve.pose(), "match over");
    Ok(())
}

fn main() {
    // Set RUST_LOG=debug for command-level logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Robot error: {}", e);
        std::process::exit(1);
    }
}
