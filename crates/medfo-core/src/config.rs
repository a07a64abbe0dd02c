//! Runtime configuration from the environment.

use std::env;
use std::path::PathBuf;

/// Database file used when `MEDFO_DB_PATH` is unset.
pub const DEFAULT_DB_FILE: &str = "medfo.db";

/// Log filter used when `MEDFO_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "medfo_core=info,medfo_llm=info";

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CoreConfig {
    /// Read `MEDFO_DB_PATH` and `MEDFO_LOG`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: lookup("MEDFO_DB_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: lookup("MEDFO_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}
