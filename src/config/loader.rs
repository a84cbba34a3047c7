use std::fs;
use std::path::{Path, PathBuf};

use super::core::FragmapConfig;
use super::scoring::RiskWeights;
use super::CONFIG_FILE_NAME;
use crate::errors::{FragmapError, Result};

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse config from a TOML string, repairing invalid risk weights
pub fn parse_and_validate_config(contents: &str) -> Result<FragmapConfig> {
    let mut config = toml::from_str::<FragmapConfig>(contents)
        .map_err(|e| FragmapError::Config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e)))?;

    let weights = &mut config.risk.weights;
    if let Err(e) = weights.validate() {
        if weights.structural < 0.0
            || weights.volatility < 0.0
            || weights.knowledge < 0.0
            || weights.criticality < 0.0
        {
            log::warn!("Invalid risk weights: {}. Using defaults.", e);
            *weights = RiskWeights::default();
        } else {
            log::warn!("Risk weights do not sum to 1.0: {}. Normalizing.", e);
            weights.normalize();
        }
    }

    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<FragmapConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // Only log actual errors, not "file not found"
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Directory and its ancestors, nearest first, up to `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.fragmap.toml`
pub fn load_config_from(start: &Path) -> FragmapConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            FragmapConfig::default()
        })
}

/// Load configuration starting from the current working directory
pub fn load_config() -> FragmapConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(&dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            FragmapConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_and_validate_config("").unwrap();
        assert_eq!(config, FragmapConfig::default());
        assert_eq!(config.policy.max_loc, 1000);
        assert_eq!(config.risk.window_days, 90);
        assert_eq!(config.audit.history_limit, 5);
        assert!(config.store.enabled);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            [policy]
            max_loc = 400

            [policy.forbidden_dependencies]
            domain = ["web"]

            [ingest]
            jobs = 2
        "#})
        .unwrap();

        assert_eq!(config.policy.max_loc, 400);
        assert_eq!(config.policy.max_classes_per_file, 5);
        assert_eq!(
            config.policy.forbidden_dependencies.get("domain"),
            Some(&vec!["web".to_string()])
        );
        assert_eq!(config.ingest.jobs, 2);
        assert_eq!(config.ingest.extensions, vec!["py".to_string()]);
    }

    #[test]
    fn test_unbalanced_weights_are_normalized() {
        let config = parse_and_validate_config(indoc! {r#"
            [risk.weights]
            structural = 1.0
            volatility = 1.0
            knowledge = 1.0
            criticality = 1.0
        "#})
        .unwrap();
        assert!((config.risk.weights.structural - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_negative_weights_reset_to_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            [risk.weights]
            structural = -1.0
        "#})
        .unwrap();
        assert_eq!(config.risk.weights, RiskWeights::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_and_validate_config("[policy\nmax_loc = ").unwrap_err();
        assert!(matches!(err, FragmapError::Config(_)));
    }

    #[test]
    fn test_load_config_from_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[audit]\nhistory_limit = 9\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config_from(&nested);
        assert_eq!(config.audit.history_limit, 9);
    }

    #[test]
    fn test_directory_ancestors_respects_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }
}
