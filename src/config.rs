//! Configuration module for HR Core.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Token issuing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Token validity in hours.
    pub token_duration_hours: i64,
    /// Admin account created on first start when no users exist.
    #[serde(default)]
    pub bootstrap: Option<BootstrapAdmin>,
}

/// First company and administrator seeded into an empty database.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub company_name: String,
    pub company_rut: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Worker document uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory where worker documents are written.
    pub dir: String,
    /// Per-file size limit in bytes.
    pub max_file_bytes: usize,
}

/// Paginated listing defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListingConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (HR__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("HR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < 16 {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be at least 16 characters".to_string(),
            ));
        }
        if self.auth.token_duration_hours <= 0 {
            return Err(ConfigError::Message(
                "auth.token_duration_hours must be positive".to_string(),
            ));
        }
        if self.listing.default_limit < 1 || self.listing.max_limit < self.listing.default_limit {
            return Err(ConfigError::Message(
                "listing.default_limit must be between 1 and listing.max_limit".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://hr.db".to_string(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production-please".to_string(),
            jwt_issuer: "hr-core".to_string(),
            token_duration_hours: 8,
            bootstrap: None,
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: "uploads/workers".to_string(),
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.token_duration_hours, 8);
        assert_eq!(config.listing.default_limit, 10);
        assert_eq!(config.uploads.max_file_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_listing_limits_rejected() {
        let mut config = Config::default();
        config.listing = ListingConfig {
            default_limit: 50,
            max_limit: 20,
        };
        assert!(config.validate().is_err());
    }
}
