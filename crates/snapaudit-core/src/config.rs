//! Layered configuration for the store, engine and CLI.
//!
//! Sources in priority order, highest wins:
//! 1. Environment variables (`SNAPAUDIT_*` prefix, `__` between sections)
//! 2. `snapaudit.toml` in the working directory, or an explicit file
//! 3. Built-in defaults
//!
//! `SNAPAUDIT_DATABASE__PATH` maps to `database.path`,
//! `SNAPAUDIT_TRAIL__PAGE_SIZE` to `trail.page_size`, and so on.

use crate::logging_facility::Profile;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "snapaudit.toml";
pub const ENV_PREFIX: &str = "SNAPAUDIT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<ConfigError> for crate::errors::ExError {
    fn from(err: ConfigError) -> Self {
        crate::errors::ExError::new(crate::errors::ExErrorKind::Config)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// How long a writer waits for the write lock before failing
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".snapaudit/store.db"),
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrailConfig {
    /// History rows fetched per page by the trail reader
    pub page_size: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub trail: TrailConfig,
}

impl StoreConfig {
    /// Load from defaults, `snapaudit.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(None))
    }

    /// Like [`load`](Self::load), but reads `.env` from the working directory first
    ///
    /// # Errors
    ///
    /// `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit TOML file in place of `snapaudit.toml`
    ///
    /// # Errors
    ///
    /// `ConfigError` if the file is missing, unparseable, or a value is invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: "config".to_string(),
                reason: format!("file not found: {}", path.display()),
            });
        }
        Self::from_figment(Self::figment(Some(path)))
    }

    /// Build the provider chain
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidValue` for a zero page size or an empty database path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trail.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "trail.page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = StoreConfig::load().expect("config loads");
            assert_eq!(config.database.path, PathBuf::from(".snapaudit/store.db"));
            assert_eq!(config.database.busy_timeout(), Duration::from_secs(5));
            assert_eq!(config.trail.page_size, 50);
            assert_eq!(config.logging.profile, Profile::Development);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [database]
                path = "data/bot.db"

                [logging]
                profile = "production"
                "#,
            )?;
            let config = StoreConfig::load().expect("config loads");
            assert_eq!(config.database.path, PathBuf::from("data/bot.db"));
            assert_eq!(config.database.busy_timeout_ms, 5000);
            assert_eq!(config.logging.profile, Profile::Production);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[trail]\npage_size = 10\n")?;
            jail.set_env("SNAPAUDIT_TRAIL__PAGE_SIZE", "25");
            jail.set_env("SNAPAUDIT_DATABASE__BUSY_TIMEOUT_MS", "100");
            let config = StoreConfig::load().expect("config loads");
            assert_eq!(config.trail.page_size, 25);
            assert_eq!(config.database.busy_timeout_ms, 100);
            Ok(())
        });
    }

    #[test]
    fn test_zero_page_size_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SNAPAUDIT_TRAIL__PAGE_SIZE", "0");
            let err = StoreConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "trail.page_size"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|_jail| {
            let err = StoreConfig::load_from(Path::new("missing.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            Ok(())
        });
    }
}
