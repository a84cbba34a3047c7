use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::scoring::RiskConfig;
use super::thresholds::PolicyConfig;

/// Root configuration structure for fragmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FragmapConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub risk: RiskConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// Velocity and forecast settings used by the auditor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
    /// Number of most recent snapshots considered for velocity
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Number of future snapshots the forecast extrapolates over
    #[serde(default = "default_horizon")]
    pub horizon: u32,

    #[serde(default = "default_velocity_alert_threshold")]
    pub velocity_alert_threshold: f64,

    /// Predicted health below which the forecast is flagged
    #[serde(default = "default_forecast_alert_health")]
    pub forecast_alert_health: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            decay_rate: default_decay_rate(),
            horizon: default_horizon(),
            velocity_alert_threshold: default_velocity_alert_threshold(),
            forecast_alert_health: default_forecast_alert_health(),
        }
    }
}

fn default_history_limit() -> usize {
    5
}

fn default_decay_rate() -> f64 {
    0.5
}

fn default_horizon() -> u32 {
    5
}

fn default_velocity_alert_threshold() -> f64 {
    0.5
}

fn default_forecast_alert_health() -> f64 {
    60.0
}

/// File enumeration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Worker threads for extraction (0 = all cores)
    #[serde(default)]
    pub jobs: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            jobs: 0,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    [
        "venv",
        ".venv",
        "__pycache__",
        ".git",
        "build",
        "dist",
        "node_modules",
        "target",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Database location, relative paths resolve against the ingestion root
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    #[serde(default = "default_store_enabled")]
    pub enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            enabled: default_store_enabled(),
        }
    }
}

impl StoreConfig {
    pub fn resolve(&self, root: &std::path::Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            root.join(&self.path)
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".fragmap/store.redb")
}

fn default_store_enabled() -> bool {
    true
}
