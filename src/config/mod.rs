//! Configuration loaded from `.fragmap.toml`.
//!
//! Every section is optional; missing keys fall back to the defaults the
//! pipeline was calibrated with.

mod core;
mod loader;
mod scoring;
mod thresholds;

pub use core::{AuditConfig, FragmapConfig, IngestConfig, StoreConfig};
pub use loader::{directory_ancestors, load_config, load_config_from, parse_and_validate_config};
pub use scoring::{RiskConfig, RiskWeights};
pub use thresholds::PolicyConfig;

/// Name of the configuration file searched for in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".fragmap.toml";
