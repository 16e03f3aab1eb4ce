use alloc::{rc::Rc, vec};
use core::cell::RefCell;

use bio_command::{
    command::Action,
    controller::CommandController,
    dashboard::Dashboard,
    named::{AutoChooser, NamedCommands},
    robot::ScheduledRobot,
    subsystem::{Subsystem, SubsystemRefExt},
    CommandRef, CommandScheduler,
};
use snafu::ResultExt;
use tracing::info;

use crate::{
    autos::{self, Mechanisms},
    commands::{self, DriveWithJoystickCommand, IntakeCommand, UpdateLedCommand},
    constants::drive::SIM_START_HEADING_DEGREES,
    drive::Pose2d,
    error::{ConfigSnafu, Result},
    hardware::Hardware,
    subsystems::{Arm, Drivetrain, Hanger, Indexer, Intake, Led, Shooter},
    telemetry::Telemetry,
};

/// Owns every subsystem and wires the drive team's controllers to them.
pub struct Robot {
    scheduler: CommandScheduler,
    dashboard: Dashboard,
    driver: CommandController,
    codriver: CommandController,

    drivetrain: Rc<RefCell<Drivetrain>>,
    intake: Rc<RefCell<Intake>>,
    indexer: Rc<RefCell<Indexer>>,
    shooter: Rc<RefCell<Shooter>>,
    arm: Rc<RefCell<Arm>>,
    hanger: Rc<RefCell<Hanger>>,
    led: Rc<RefCell<Led>>,

    named_commands: NamedCommands,
    auto_chooser: AutoChooser,
    autonomous_command: Option<CommandRef>,
}

impl Robot {
    /// Drivetrain constants are taken from `hardware.swerve`.
    pub fn new(hardware: Hardware) -> Result<Self> {
        let Hardware {
            simulation,
            clock,
            driver,
            codriver,
            swerve,
            intake,
            indexer,
            note_sensor,
            shooter_top,
            shooter_bottom,
            arm,
            hanger,
            led,
        } = hardware;

        let scheduler = CommandScheduler::new(clock);
        let dashboard = Dashboard::new();

        let drivetrain = Drivetrain::new(swerve)
            .context(ConfigSnafu)?
            .register(&scheduler);
        let mechanisms = Mechanisms {
            intake: Intake::new(intake).register(&scheduler),
            indexer: Indexer::new(indexer, note_sensor).register(&scheduler),
            shooter: Shooter::new(shooter_top, shooter_bottom).register(&scheduler),
        };
        let arm = Arm::new(arm).register(&scheduler);
        let hanger = Hanger::new(hanger).register(&scheduler);
        let led = Led::new(led).register(&scheduler);

        let mut named_commands = NamedCommands::new(&scheduler);
        autos::register_named_commands(&mut named_commands, &mechanisms)?;
        let auto_chooser = autos::build_auto_chooser(&named_commands, &dashboard);

        let Mechanisms {
            intake,
            indexer,
            shooter,
        } = mechanisms;
        let robot = Self {
            driver: CommandController::new(&scheduler, driver),
            codriver: CommandController::new(&scheduler, codriver),
            scheduler,
            dashboard,
            drivetrain,
            intake,
            indexer,
            shooter,
            arm,
            hanger,
            led,
            named_commands,
            auto_chooser,
            autonomous_command: None,
        };

        robot.configure_bindings(simulation)?;
        robot.configure_co_bindings();
        robot.scheduler.set_default_command(
            &robot.led,
            UpdateLedCommand::new(robot.led.clone(), robot.indexer.clone()),
        )?;

        info!(routines = robot.named_commands.len(), "robot configured");
        Ok(robot)
    }

    /// Driver: field-centric driving and heading re-seed.
    fn configure_bindings(&self, simulation: bool) -> Result {
        self.scheduler.set_default_command(
            &self.drivetrain,
            DriveWithJoystickCommand::new(self.drivetrain.clone(), self.driver.clone()),
        )?;

        self.driver.touchpad().on_true(
            self.drivetrain
                .run_once(|drivetrain| drivetrain.seed_field_relative())
                .named("seed field relative"),
        );

        let mut drivetrain = self.drivetrain.borrow_mut();
        if simulation {
            drivetrain.seed_field_relative_to(
                Pose2d::default().with_heading_degrees(SIM_START_HEADING_DEGREES),
            )?;
        } else {
            let telemetry = Telemetry::new(drivetrain.config().max_speed, &self.dashboard);
            drivetrain.register_telemetry(move |state| telemetry.telemeterize(state));
        }
        Ok(())
    }

    /// Co-driver: the superstructure.
    fn configure_co_bindings(&self) {
        let (intake, indexer, shooter, hanger) =
            (&self.intake, &self.indexer, &self.shooter, &self.hanger);

        self.codriver
            .left_bumper()
            .while_true(IntakeCommand::new(intake.clone(), indexer.clone()));
        self.codriver
            .left_trigger()
            .on_true(commands::spin_up(shooter))
            .on_false(commands::stop_shooter(shooter));

        let is_shooting = shooter.clone();
        self.codriver
            .right_trigger()
            .on_true(Action::either(
                commands::pass(indexer),
                commands::stop_indexer(indexer),
                move || is_shooting.borrow().is_shooting(),
            ))
            .on_false(commands::stop_indexer(indexer));
        self.codriver.right_bumper().on_true(Action::sequence(vec![
            commands::stop_indexer(indexer),
            commands::stop_shooter(shooter),
        ]));

        self.codriver
            .pov_up()
            .while_true(commands::extend_hanger(hanger));
        self.codriver
            .pov_down()
            .while_true(commands::retract_hanger(hanger));
        self.codriver
            .pov_center()
            .while_true(commands::stop_hanger(hanger));

        self.codriver
            .x()
            .on_true(commands::amp_shot(shooter))
            .on_false(commands::stop_shooter(shooter));
        self.codriver
            .b()
            .on_true(Action::parallel(vec![
                commands::out_take(intake),
                commands::reverse_indexer(indexer),
            ]))
            .on_false(Action::sequence(vec![
                commands::stop_indexer(indexer),
                commands::stop_intake(intake),
            ]));
    }

    pub fn scheduler(&self) -> &CommandScheduler {
        &self.scheduler
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn named_commands(&self) -> &NamedCommands {
        &self.named_commands
    }

    pub fn auto_chooser(&self) -> &AutoChooser {
        &self.auto_chooser
    }

    /// The routine started by the last autonomous period, until teleop cancels it.
    pub fn autonomous_command(&self) -> Option<&CommandRef> {
        self.autonomous_command.as_ref()
    }

    pub fn drivetrain(&self) -> &Rc<RefCell<Drivetrain>> {
        &self.drivetrain
    }

    pub fn intake(&self) -> &Rc<RefCell<Intake>> {
        &self.intake
    }

    pub fn indexer(&self) -> &Rc<RefCell<Indexer>> {
        &self.indexer
    }

    pub fn shooter(&self) -> &Rc<RefCell<Shooter>> {
        &self.shooter
    }

    pub fn arm(&self) -> &Rc<RefCell<Arm>> {
        &self.arm
    }

    pub fn hanger(&self) -> &Rc<RefCell<Hanger>> {
        &self.hanger
    }

    pub fn led(&self) -> &Rc<RefCell<Led>> {
        &self.led
    }
}

impl ScheduledRobot for Robot {
    fn periodic(&mut self) -> bio_command::Result {
        self.scheduler.run()
    }

    fn disabled_init(&mut self) -> bio_command::Result {
        self.scheduler.set_enabled(false);
        Ok(())
    }

    fn autonomous_init(&mut self) -> bio_command::Result {
        self.scheduler.set_enabled(true);
        self.autonomous_command = self.auto_chooser.selected(&self.named_commands)?;
        match &self.autonomous_command {
            Some(command) => {
                info!(routine = %self.auto_chooser.selected_name(), "starting autonomous routine");
                self.scheduler.schedule(command.clone())
            }
            None => Ok(()),
        }
    }

    fn opcontrol_init(&mut self) -> bio_command::Result {
        self.scheduler.set_enabled(true);
        match self.autonomous_command.take() {
            Some(command) => self.scheduler.cancel(&command),
            None => Ok(()),
        }
    }
}
