//! Routines offered to the autonomous selector, looked up by name.

use alloc::{rc::Rc, vec};
use core::{cell::RefCell, time::Duration};

use bio_command::{
    command::Action,
    dashboard::Dashboard,
    named::{AutoChooser, NamedCommands},
    Result,
};

use crate::{
    commands::{self, IntakeCommand},
    constants::dashboard::AUTO_CHOOSER_KEY,
    subsystems::{Indexer, Intake, Shooter},
};

pub const INTAKE_ON: &str = "IntakeOn";
pub const SHOOT: &str = "Shoot";
pub const SPIN_UP: &str = "SpinUp";
pub const JUST_SHOOT: &str = "JustShoot";
pub const ALL_SYSTEMS_GO: &str = "ALLSYSTEMSGO";
/// The key the path files use, spelling included.
pub const FUNNY_INTAKE: &str = "FunnyInake";
pub const JUST_STOP: &str = "JustStop";

/// The mechanisms the routines drive.
#[derive(Debug, Clone)]
pub struct Mechanisms {
    pub intake: Rc<RefCell<Intake>>,
    pub indexer: Rc<RefCell<Indexer>>,
    pub shooter: Rc<RefCell<Shooter>>,
}

/// Spins the shooter up and passes the note once the flywheels have had a second.
pub fn shoot(m: &Mechanisms) -> Action {
    Action::parallel(vec![
        commands::spin_up(&m.shooter),
        Action::sequence(vec![
            Action::wait(Duration::from_secs(1)),
            commands::pass(&m.indexer),
        ]),
    ])
    .with_timeout(Duration::from_secs(3))
}

pub fn just_shoot(m: &Mechanisms) -> Action {
    commands::pass(&m.indexer).with_timeout(Duration::from_millis(500))
}

pub fn all_systems_go(m: &Mechanisms) -> Action {
    Action::parallel(vec![
        commands::intake(&m.intake),
        commands::spin_up(&m.shooter),
        commands::pass(&m.indexer),
    ])
    .with_timeout(Duration::from_millis(2500))
}

pub fn funny_intake(m: &Mechanisms) -> Action {
    Action::parallel(vec![commands::intake(&m.intake), commands::pass(&m.indexer)])
        .with_timeout(Duration::from_millis(750))
}

pub fn just_stop(m: &Mechanisms) -> Action {
    Action::parallel(vec![
        commands::stop_indexer(&m.indexer),
        commands::stop_shooter(&m.shooter),
    ])
}

pub fn register_named_commands(named: &mut NamedCommands, m: &Mechanisms) -> Result {
    named.register(INTAKE_ON, IntakeCommand::new(m.intake.clone(), m.indexer.clone()))?;
    named.register(SHOOT, shoot(m))?;
    named.register(SPIN_UP, commands::spin_up(&m.shooter))?;
    named.register(JUST_SHOOT, just_shoot(m))?;
    named.register(ALL_SYSTEMS_GO, all_systems_go(m))?;
    named.register(FUNNY_INTAKE, funny_intake(m))?;
    named.register(JUST_STOP, just_stop(m))
}

/// The "Auto Mode" chooser. Defaults to running nothing.
pub fn build_auto_chooser(named: &NamedCommands, dashboard: &Dashboard) -> AutoChooser {
    AutoChooser::build(named, dashboard, AUTO_CHOOSER_KEY)
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use bio_command::{
        command::Outline,
        named::NONE_OPTION,
        time::ManualClock,
        CommandScheduler,
    };

    use super::*;
    use crate::hardware::sim::SimHardware;

    fn registry() -> (NamedCommands, Dashboard) {
        let sim = SimHardware::new();
        let hardware = sim.hardware();
        let mechanisms = Mechanisms {
            intake: Rc::new(RefCell::new(Intake::new(hardware.intake))),
            indexer: Rc::new(RefCell::new(Indexer::new(
                hardware.indexer,
                hardware.note_sensor,
            ))),
            shooter: Rc::new(RefCell::new(Shooter::new(
                hardware.shooter_top,
                hardware.shooter_bottom,
            ))),
        };
        let scheduler = CommandScheduler::new(Rc::new(ManualClock::new()));
        let mut named = NamedCommands::new(&scheduler);
        register_named_commands(&mut named, &mechanisms).unwrap();
        (named, Dashboard::new())
    }

    fn timeout(action: Outline, duration: Duration) -> Outline {
        Outline::Timeout {
            action: Box::new(action),
            duration,
        }
    }

    #[test]
    fn routines_have_their_exact_shapes() {
        let (named, _) = registry();
        let outline = |name| named.outline(name).unwrap();

        assert_eq!(outline(INTAKE_ON), Outline::Command("IntakeCommand"));
        assert_eq!(
            outline(SHOOT),
            timeout(
                Outline::Parallel(vec![
                    Outline::Instant("spin up"),
                    Outline::Sequential(vec![
                        Outline::Wait(Duration::from_secs(1)),
                        Outline::Instant("pass"),
                    ]),
                ]),
                Duration::from_secs(3),
            )
        );
        assert_eq!(outline(SPIN_UP), Outline::Instant("spin up"));
        assert_eq!(
            outline(JUST_SHOOT),
            timeout(Outline::Instant("pass"), Duration::from_millis(500))
        );
        assert_eq!(
            outline(ALL_SYSTEMS_GO),
            timeout(
                Outline::Parallel(vec![
                    Outline::Instant("intake"),
                    Outline::Instant("spin up"),
                    Outline::Instant("pass"),
                ]),
                Duration::from_millis(2500),
            )
        );
        assert_eq!(
            outline(FUNNY_INTAKE),
            timeout(
                Outline::Parallel(vec![Outline::Instant("intake"), Outline::Instant("pass")]),
                Duration::from_millis(750),
            )
        );
        assert_eq!(
            outline(JUST_STOP),
            Outline::Parallel(vec![
                Outline::Instant("stop indexer"),
                Outline::Instant("stop shooter"),
            ])
        );
    }

    #[test]
    fn chooser_offers_every_routine_after_none() {
        let (named, dashboard) = registry();
        let chooser = build_auto_chooser(&named, &dashboard);

        assert_eq!(
            chooser.options(),
            [
                NONE_OPTION,
                INTAKE_ON,
                SHOOT,
                SPIN_UP,
                JUST_SHOOT,
                ALL_SYSTEMS_GO,
                FUNNY_INTAKE,
                JUST_STOP,
            ]
        );
        assert!(chooser.selected(&named).unwrap().is_none());
    }
}
