// src/config.rs

//! Configuration for the resolve engine.
//!
//! Every section can be deserialized from a JSON file and falls back to
//! sensible defaults for missing fields. Nothing here is required: without a
//! file the engine picks everything from CPU detection.

use crate::blit::CopyStrategy;
use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "LOONGSON_RESOLVE_CONFIG";

/// Process-wide configuration, read on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

// --- Top-Level Configuration Structure ---

/// The root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Bulk copy settings.
    pub copy: CopyConfig,
    /// Tiled resolve settings.
    pub resolve: ResolveConfig,
    /// Parameters for the `resolve-bench` binary.
    pub bench: BenchConfig,
}

// --- Copy Configuration ---

/// Requested copy strategy. `Auto` uses the widest one the CPU supports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Portable,
    Vector128,
    Vector256,
}

impl StrategyChoice {
    /// The fixed strategy this choice names, `None` for `Auto`.
    pub fn fixed(self) -> Option<CopyStrategy> {
        match self {
            StrategyChoice::Auto => None,
            StrategyChoice::Portable => Some(CopyStrategy::Portable),
            StrategyChoice::Vector128 => Some(CopyStrategy::Vector128),
            StrategyChoice::Vector256 => Some(CopyStrategy::Vector256),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CopyConfig {
    /// Copy strategy override. Clamped to what the CPU can run.
    pub strategy: StrategyChoice,
}

// --- Resolve Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolveConfig {
    /// Use the portable resolvers even when a vector unit is present.
    pub force_portable: bool,
}

// --- Bench Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    /// Surface width in pixels.
    pub width: usize,
    /// Surface height in pixels.
    pub height: usize,
    /// Resolves per measured path.
    pub iterations: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            width: 1920,
            height: 1080,
            iterations: 50,
        }
    }
}

impl Config {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults if the
    /// variable is unset or the file is unusable.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Config::load(Path::new(&path)).unwrap_or_else(|e| {
                warn!("{:#}; using default configuration", e);
                Config::default()
            }),
            None => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn it_should_fill_missing_sections_with_defaults() {
        let config: Config = serde_json::from_str(r#"{ "copy": { "strategy": "portable" } }"#)
            .unwrap();
        assert_eq!(config.copy.strategy, StrategyChoice::Portable);
        assert!(!config.resolve.force_portable);
        assert_eq!(config.bench, BenchConfig::default());
    }

    #[test]
    fn it_should_parse_an_empty_document() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn it_should_map_choices_to_strategies() {
        assert_eq!(StrategyChoice::Auto.fixed(), None);
        assert_eq!(StrategyChoice::Vector128.fixed(), Some(CopyStrategy::Vector128));
    }

    #[test]
    fn it_should_load_a_config_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!(
            "loongson-resolve-config-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path)?;
        write!(
            file,
            r#"{{
                "resolve": {{ "force_portable": true }},
                "bench": {{ "width": 64, "height": 32, "iterations": 2 }}
            }}"#
        )?;
        drop(file);

        let config = Config::load(&path)?;
        std::fs::remove_file(&path)?;

        assert!(config.resolve.force_portable);
        assert_eq!(config.bench.width, 64);
        assert_eq!(config.bench.iterations, 2);
        assert_eq!(config.copy.strategy, StrategyChoice::Auto);
        Ok(())
    }

    // The only test that touches the config variable.
    #[test_log::test]
    fn it_should_read_the_env_file_and_fall_back_to_defaults() -> anyhow::Result<()> {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/loongson-resolve.json");
        assert_eq!(Config::from_env(), Config::default());

        let path = std::env::temp_dir().join(format!(
            "loongson-resolve-env-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "copy": { "strategy": "vector128" } }"#)?;
        std::env::set_var(CONFIG_ENV_VAR, &path);
        let loaded = Config::from_env();

        std::fs::write(&path, "{ not json")?;
        let garbled = Config::from_env();

        std::env::remove_var(CONFIG_ENV_VAR);
        std::fs::remove_file(&path)?;

        assert_eq!(loaded.copy.strategy, StrategyChoice::Vector128);
        assert_eq!(garbled, Config::default());
        assert_eq!(Config::from_env(), Config::default());
        Ok(())
    }

    #[test]
    fn it_should_report_a_missing_file_with_its_path() {
        let err = Config::load(Path::new("/nonexistent/loongson-resolve.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/loongson-resolve.json"));
    }
}
