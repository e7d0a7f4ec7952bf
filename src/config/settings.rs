use crate::error::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

const PARALLEL_VERIFICATION_KEY: &str = "LEDGER_PARALLEL_VERIFICATION";
const LOG_REJECTIONS_KEY: &str = "LEDGER_LOG_REJECTIONS";

/// Tunables of the ledger core. Consensus rules are not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verify the non-coinbase transactions of a batch on the rayon pool
    pub parallel_verification: bool,
    /// Emit a warning for every refused transaction
    pub log_rejections: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            parallel_verification: false,
            log_rejections: true,
        }
    }
}

impl Config {
    /// Defaults, overridden by `LEDGER_*` environment variables when present
    pub fn from_env() -> Config {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a TOML file, then let the environment override it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let contents = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded ledger config from {}", path.as_ref().display());
        let mut config = Config::from_toml_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(value) = env_flag(PARALLEL_VERIFICATION_KEY) {
            self.parallel_verification = value;
        }
        if let Some(value) = env_flag(LOG_REJECTIONS_KEY) {
            self.log_rejections = value;
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            log::warn!("Ignoring unrecognised value {raw:?} for {key}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.parallel_verification);
        assert!(config.log_rejections);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("parallel_verification = true").unwrap();
        assert!(config.parallel_verification);
        assert!(config.log_rejections);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = Config::from_toml_str("parallel_verification = \"maybe\"");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::from_file("/nonexistent/ledger.toml");
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }
}
