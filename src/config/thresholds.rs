use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static rule set evaluated by the policy guard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Files at or above this many lines violate the size rule
    #[serde(default = "default_max_loc")]
    pub max_loc: usize,

    /// Files with more classes than this violate the cohesion rule
    #[serde(default = "default_max_classes_per_file")]
    pub max_classes_per_file: usize,

    /// Lower-level module name -> higher-level module names it must not depend on
    #[serde(default = "default_forbidden_dependencies")]
    pub forbidden_dependencies: BTreeMap<String, Vec<String>>,

    /// Gate fails when policy health drops below this value
    #[serde(default = "default_min_health")]
    pub min_health: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_loc: default_max_loc(),
            max_classes_per_file: default_max_classes_per_file(),
            forbidden_dependencies: default_forbidden_dependencies(),
            min_health: default_min_health(),
        }
    }
}

fn default_max_loc() -> usize {
    1000
}

fn default_max_classes_per_file() -> usize {
    5
}

fn default_forbidden_dependencies() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "core".to_string(),
            vec!["main".to_string(), "app".to_string()],
        ),
        ("cognition".to_string(), vec!["main".to_string()]),
    ])
}

fn default_min_health() -> f64 {
    70.0
}
