//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod quota;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::LoggingConfig;
pub use self::quota::QuotaConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `DRIVE__SERVER__PORT`.
pub const ENV_PREFIX: &str = "DRIVE";

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `DRIVE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Storage quota policy.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables prefixed with `DRIVE__`. Missing files are not an error.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", &format!("config/{env}"))
    }

    /// Load configuration from an explicit base file and overlay.
    pub fn load_from(base: &str, overlay: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(overlay).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the drive unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.quota.default_max_bytes < 0 {
            return Err(AppError::configuration(
                "quota.default_max_bytes must not be negative",
            ));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.backend is 'postgres'",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_memory_backend_and_two_gib_quota() {
        let config = AppConfig::default();
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.quota.default_max_bytes, 2_147_483_648);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Postgres;
        let err = config.validate().unwrap_err();
        assert!(err.is(crate::ErrorKind::Configuration));
    }

    #[test]
    fn test_negative_default_quota_is_rejected() {
        let mut config = AppConfig::default();
        config.quota.default_max_bytes = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from("does/not/exist", "nor/this").expect("load");
        assert_eq!(config.logging.level, "info");
    }
}
