//! Workbench configuration.
//!
//! Read from environment variables; front-ends override individual fields
//! (for example from command-line flags) before building the workbench.
//!
//! | Variable                | Field      | Default                  |
//! |-------------------------|------------|--------------------------|
//! | `ASTROLABE_DATA_DIR`    | `data_dir` | `~/.config/astrolabe`    |
//! | `ASTROLABE_DEBOUNCE_MS` | `debounce` | 1000 ms                  |
//! | `ASTROLABE_LOG_DIR`     | `log_dir`  | none (activity log off)  |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::paths::default_data_dir;

pub const DATA_DIR_VAR: &str = "ASTROLABE_DATA_DIR";
pub const DEBOUNCE_VAR: &str = "ASTROLABE_DEBOUNCE_MS";
pub const LOG_DIR_VAR: &str = "ASTROLABE_LOG_DIR";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No data directory: set {DATA_DIR_VAR} or HOME ({0})")]
    NoDataDir(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    pub data_dir: PathBuf,
    pub debounce: Duration,
    pub log_dir: Option<PathBuf>,
}

impl WorkbenchConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            debounce: DEFAULT_DEBOUNCE,
            log_dir: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = match var(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().map_err(ConfigError::NoDataDir)?,
        };

        let debounce = match var(DEBOUNCE_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    log::warn!("Ignoring {DEBOUNCE_VAR}={raw}: {e}");
                    DEFAULT_DEBOUNCE
                }
            },
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            data_dir,
            debounce,
            log_dir: var(LOG_DIR_VAR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let config = WorkbenchConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/data/astrolabe"),
            (DEBOUNCE_VAR, "250"),
            (LOG_DIR_VAR, "/var/log/astrolabe"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/data/astrolabe"));
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/astrolabe")));
    }

    #[test]
    fn invalid_debounce_falls_back_to_default() {
        let config = WorkbenchConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/data"),
            (DEBOUNCE_VAR, "soon"),
        ]))
        .unwrap();

        assert_eq!(config.debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn empty_log_dir_is_unset() {
        let config =
            WorkbenchConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "/data"), (LOG_DIR_VAR, " ")]))
                .unwrap();

        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn new_uses_defaults() {
        let config = WorkbenchConfig::new("/data");
        assert_eq!(config.debounce, DEFAULT_DEBOUNCE);
        assert!(config.log_dir.is_none());
    }
}
