//! Runtime setup: logging, thread pool and configuration.

use crate::config::{load_config, parse_and_validate_config, FragmapConfig};
use anyhow::{Context, Result};
use std::path::Path;

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new();

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        log::debug!("Thread pool already configured: {}", e);
    }
}

/// Log level for a `-v` count; `RUST_LOG` still takes precedence
pub fn log_level(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

pub fn init_logging(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbosity))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Explicit config file, or the nearest `.fragmap.toml`
pub fn resolve_config(explicit: Option<&Path>) -> Result<FragmapConfig> {
    match explicit {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Ok(parse_and_validate_config(&contents)?)
        }
        None => Ok(load_config()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(1), log::LevelFilter::Info);
        assert_eq!(log_level(5), log::LevelFilter::Trace);
    }

    #[test]
    fn test_resolve_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            indoc! {r#"
                [policy]
                max_loc = 300
            "#},
        )
        .unwrap();

        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.policy.max_loc, 300);
        assert!(resolve_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
