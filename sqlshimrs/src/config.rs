//! Configuration for translators.
//!
//! TOML with global defaults and per-datasource overrides. A datasource names
//! one database instance: its dialect, version and time zone.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::error::{Result, SqlshimError};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlshimConfig {
    /// Settings used by every datasource unless overridden.
    pub defaults: TranslatorConfig,

    /// Per-datasource overrides, keyed by datasource name.
    pub datasources: HashMap<String, DatasourceConfig>,
}

/// Everything a translator needs besides the dialect's static tables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub dialect: DialectKind,
    /// `UTC`, `+05:30`, `-0800` or `GMT+01:00`. Unset means UTC.
    pub database_time_zone: Option<String>,
    /// Unset means the dialect's default version.
    pub database_version: Option<String>,
    /// Lift bind-eligible literals into `?` placeholders.
    pub use_bind_variables: bool,
    /// Replaces the dialect's IN-list limit.
    pub max_in_criteria_size: Option<usize>,
}

/// Per-datasource overrides. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasourceConfig {
    pub dialect: Option<DialectKind>,
    pub database_time_zone: Option<String>,
    pub database_version: Option<String>,
    pub use_bind_variables: Option<bool>,
    pub max_in_criteria_size: Option<usize>,
}

impl SqlshimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SqlshimError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| SqlshimError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations.
    ///
    /// Search order:
    /// 1. `SQLSHIM_CONFIG` environment variable
    /// 2. `./sqlshim.toml`
    /// 3. `<user config dir>/sqlshim/config.toml`
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("SQLSHIM_CONFIG") {
            if let Ok(cfg) = Self::from_file(&path) {
                tracing::info!(path = %path, "loaded config from SQLSHIM_CONFIG");
                return cfg;
            }
        }

        if let Ok(cfg) = Self::from_file("sqlshim.toml") {
            tracing::info!("loaded config from ./sqlshim.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlshim").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }

    /// Resolved settings for a datasource; unknown names get the defaults.
    pub fn for_datasource(&self, name: &str) -> TranslatorConfig {
        match self.datasources.get(name) {
            Some(ds) => ds.merge_onto(&self.defaults),
            None => self.defaults.clone(),
        }
    }
}

impl DatasourceConfig {
    fn merge_onto(&self, defaults: &TranslatorConfig) -> TranslatorConfig {
        TranslatorConfig {
            dialect: self.dialect.unwrap_or(defaults.dialect),
            database_time_zone: self
                .database_time_zone
                .clone()
                .or_else(|| defaults.database_time_zone.clone()),
            database_version: self
                .database_version
                .clone()
                .or_else(|| defaults.database_version.clone()),
            use_bind_variables: self
                .use_bind_variables
                .unwrap_or(defaults.use_bind_variables),
            max_in_criteria_size: self
                .max_in_criteria_size
                .or(defaults.max_in_criteria_size),
        }
    }
}
