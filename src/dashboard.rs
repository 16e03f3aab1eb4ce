use alloc::{
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
use core::cell::RefCell;

use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardValue {
    Number(f64),
    Text(String),
    /// A chooser widget: the options shown and the one currently picked.
    Choices {
        options: Vec<String>,
        selected: String,
    },
}

/// A keyed table of values shown to the drive team. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    entries: Rc<RefCell<HashMap<String, DashboardValue>>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: DashboardValue) {
        self.entries.borrow_mut().insert(key.to_string(), value);
    }

    pub fn put_number(&self, key: &str, value: f64) {
        self.put(key, DashboardValue::Number(value));
    }

    pub fn put_string(&self, key: &str, value: &str) {
        self.put(key, DashboardValue::Text(value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<DashboardValue> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            DashboardValue::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            DashboardValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Changes the pick of an existing chooser. Returns false if `key` is not a chooser
    /// or does not offer `option`.
    pub fn choose(&self, key: &str, option: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(key) {
            Some(DashboardValue::Choices { options, selected })
                if options.iter().any(|o| o == option) =>
            {
                *selected = option.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn values_are_typed() {
        let dashboard = Dashboard::new();
        dashboard.put_number("Speed", 1.5);
        dashboard.put_string("Mode", "Teleop");

        assert_eq!(dashboard.number("Speed"), Some(1.5));
        assert_eq!(dashboard.string("Speed"), None);
        assert_eq!(dashboard.string("Mode").as_deref(), Some("Teleop"));
        assert_eq!(dashboard.len(), 2);
    }

    #[test]
    fn choose_only_accepts_offered_options() {
        let dashboard = Dashboard::new();
        dashboard.put(
            "Auto",
            DashboardValue::Choices {
                options: vec!["None".to_string(), "Shoot".to_string()],
                selected: "None".to_string(),
            },
        );

        assert!(!dashboard.choose("Auto", "Dance"));
        assert!(!dashboard.choose("Missing", "Shoot"));
        assert!(dashboard.choose("Auto", "Shoot"));
        assert!(matches!(
            dashboard.get("Auto"),
            Some(DashboardValue::Choices { selected, .. }) if selected == "Shoot"
        ));
    }
}
