use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// A role-play preset: who narrates, what world it is, and how dungeon rooms
/// are described. Every text field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub narrator_personality: String,
    #[serde(default)]
    pub world_building: String,
    #[serde(default)]
    pub dungeon_room_building: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioNotFound {
    pub name: String,
    pub available: Vec<String>,
}

impl fmt::Display for ScenarioNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.available.is_empty() {
            write!(
                f,
                "Scenario '{}' not found. No scenarios are configured.",
                self.name
            )
        } else {
            write!(
                f,
                "Scenario '{}' not found. Available scenarios: {}",
                self.name,
                self.available.join(", ")
            )
        }
    }
}

impl Error for ScenarioNotFound {}

/// Read-only set of scenarios loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Look up a scenario by name. An exact match wins; otherwise a
    /// case-insensitive match is accepted.
    pub fn get(&self, name: &str) -> Result<&Scenario, ScenarioNotFound> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .or_else(|| {
                self.scenarios
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| ScenarioNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// 1-based lookup used by the numbered picker.
    pub fn by_number(&self, number: usize) -> Option<&Scenario> {
        number
            .checked_sub(1)
            .and_then(|index| self.scenarios.get(index))
    }

    pub fn names(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalog::new(vec![
            Scenario {
                name: "Forest".to_string(),
                narrator_personality: "grim".to_string(),
                ..Default::default()
            },
            Scenario {
                name: "forest".to_string(),
                description: "lowercase twin".to_string(),
                ..Default::default()
            },
            Scenario {
                name: "Harbor".to_string(),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn exact_name_wins_over_case_insensitive_match() {
        let catalog = catalog();
        assert_eq!(catalog.get("forest").unwrap().description, "lowercase twin");
        assert_eq!(catalog.get("Forest").unwrap().narrator_personality, "grim");
    }

    #[test]
    fn case_insensitive_fallback() {
        assert_eq!(catalog().get("HARBOR").unwrap().name, "Harbor");
    }

    #[test]
    fn missing_scenario_lists_available_names() {
        let err = catalog().get("Desert").unwrap_err();
        assert_eq!(err.name, "Desert");
        assert_eq!(err.available, vec!["Forest", "forest", "Harbor"]);
        assert!(err.to_string().contains("Available scenarios: Forest, forest, Harbor"));
    }

    #[test]
    fn empty_catalog_reports_no_scenarios() {
        let err = ScenarioCatalog::default().get("Forest").unwrap_err();
        assert!(err.to_string().contains("No scenarios are configured"));
    }

    #[test]
    fn numbered_lookup_is_one_based() {
        let catalog = catalog();
        assert!(catalog.by_number(0).is_none());
        assert_eq!(catalog.by_number(3).unwrap().name, "Harbor");
        assert!(catalog.by_number(4).is_none());
    }
}
