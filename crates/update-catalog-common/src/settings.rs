//! Process configuration.
//!
//! Configuration resolution is a one-shot read at startup: environment
//! variables layered over an optional `catalog.toml` in the working
//! directory. Nothing re-reads configuration at runtime.

use serde::Deserialize;

/// Error type for configuration failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Resolved process settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Postgres connection string for the store backend
    #[serde(default)]
    pub postgres_dsn: String,

    /// HTTP listen port for the catalog API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Base URL of the catalog server, used by the updater client
    #[serde(default)]
    pub catalog_url: String,

    /// Log filter directive (overridable via RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings from `catalog.toml` (if present) and the environment.
    ///
    /// Environment keys are the upper-cased field names: `POSTGRES_DSN`,
    /// `API_PORT`, `CATALOG_URL`, `LOG_LEVEL`.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("catalog").required(false))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// The DSN, or an error naming the missing key.
    pub fn require_postgres_dsn(&self) -> Result<&str, SettingsError> {
        if self.postgres_dsn.is_empty() {
            return Err(SettingsError::Missing("POSTGRES_DSN"));
        }

        Ok(&self.postgres_dsn)
    }

    /// The catalog base URL, or an error naming the missing key.
    pub fn require_catalog_url(&self) -> Result<&str, SettingsError> {
        if self.catalog_url.is_empty() {
            return Err(SettingsError::Missing("CATALOG_URL"));
        }

        Ok(&self.catalog_url)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            postgres_dsn: String::new(),
            api_port: default_api_port(),
            catalog_url: String::new(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_port, 8080);
        assert_eq!(settings.log_level, "info");
        assert!(settings.require_postgres_dsn().is_err());
        assert!(settings.require_catalog_url().is_err());
    }
}
