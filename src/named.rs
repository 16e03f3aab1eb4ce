//! Routines registered by name, for the autonomous selector.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use hashbrown::HashMap;
use snafu::ensure;
use tracing::{debug, info};

use crate::{
    command::{IntoCommand, Outline},
    dashboard::{Dashboard, DashboardValue},
    error::{DuplicateRoutineSnafu, UnknownRoutineSnafu},
    CommandRef, CommandScheduler, Result,
};

/// Name shown for the chooser's default option, which runs nothing.
pub const NONE_OPTION: &str = "None";

/// Commands looked up by name. Names are registered once and never removed.
pub struct NamedCommands {
    scheduler: CommandScheduler,
    commands: HashMap<String, CommandRef>,
    order: Vec<String>,
}

impl NamedCommands {
    pub fn new(scheduler: &CommandScheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, command: impl IntoCommand) -> Result {
        ensure!(
            !self.commands.contains_key(name),
            DuplicateRoutineSnafu { name }
        );
        let command = command.into_command(&self.scheduler);
        debug!(name, outline = ?command.outline(), "registered named command");
        self.commands.insert(name.to_string(), command);
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<CommandRef> {
        self.commands
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownRoutineSnafu { name }.build())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn outline(&self, name: &str) -> Result<Outline> {
        Ok(self.get(name)?.outline())
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A dashboard chooser offering every named command plus [`NONE_OPTION`].
///
/// The dashboard entry is the source of truth for the selection, so a pick made by the
/// drive team on the dashboard is what [`AutoChooser::selected`] reports.
pub struct AutoChooser {
    dashboard: Dashboard,
    key: String,
}

impl AutoChooser {
    pub fn build(commands: &NamedCommands, dashboard: &Dashboard, key: &str) -> Self {
        let mut options = Vec::with_capacity(commands.len() + 1);
        options.push(NONE_OPTION.to_string());
        options.extend(commands.names().map(str::to_string));

        dashboard.put(
            key,
            DashboardValue::Choices {
                options,
                selected: NONE_OPTION.to_string(),
            },
        );
        Self {
            dashboard: dashboard.clone(),
            key: key.to_string(),
        }
    }

    pub fn select(&self, option: &str) -> Result {
        ensure!(
            self.dashboard.choose(&self.key, option),
            UnknownRoutineSnafu { name: option }
        );
        info!(option, "autonomous routine selected");
        Ok(())
    }

    pub fn selected_name(&self) -> String {
        match self.dashboard.get(&self.key) {
            Some(DashboardValue::Choices { selected, .. }) => selected,
            _ => NONE_OPTION.to_string(),
        }
    }

    /// The command behind the current pick, or `None` for the default option.
    pub fn selected(&self, commands: &NamedCommands) -> Result<Option<CommandRef>> {
        let name = self.selected_name();
        if name == NONE_OPTION {
            return Ok(None);
        }
        commands.get(&name).map(Some)
    }

    pub fn options(&self) -> Vec<String> {
        match self.dashboard.get(&self.key) {
            Some(DashboardValue::Choices { options, .. }) => options,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::time::Duration;

    use super::*;
    use crate::{command::Action, time::ManualClock, Error};

    fn registry() -> NamedCommands {
        let scheduler = CommandScheduler::new(Rc::new(ManualClock::new()));
        let mut commands = NamedCommands::new(&scheduler);
        commands
            .register("Wait", Action::wait(Duration::from_secs(1)))
            .unwrap();
        commands
            .register("Nothing", Action::instant("nothing", || Ok(())))
            .unwrap();
        commands
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut commands = registry();
        let error = commands
            .register("Wait", Action::wait(Duration::from_secs(2)))
            .unwrap_err();
        assert!(matches!(error, Error::DuplicateRoutine { name } if name == "Wait"));
        assert_eq!(
            commands.outline("Wait").unwrap(),
            Outline::Wait(Duration::from_secs(1))
        );
    }

    #[test]
    fn unknown_names_are_errors() {
        let commands = registry();
        assert!(matches!(
            commands.get("Dance"),
            Err(Error::UnknownRoutine { name }) if name == "Dance"
        ));
        assert_eq!(commands.names().collect::<Vec<_>>(), ["Wait", "Nothing"]);
    }

    #[test]
    fn chooser_defaults_to_none_and_resolves_picks() {
        let commands = registry();
        let dashboard = Dashboard::new();
        let chooser = AutoChooser::build(&commands, &dashboard, "Auto Mode");

        assert_eq!(chooser.options(), ["None", "Wait", "Nothing"]);
        assert!(chooser.selected(&commands).unwrap().is_none());

        chooser.select("Nothing").unwrap();
        let selected = chooser.selected(&commands).unwrap().unwrap();
        assert_eq!(selected, commands.get("Nothing").unwrap());

        assert!(chooser.select("Dance").is_err());
        assert_eq!(chooser.selected_name(), "Nothing");
    }
}
