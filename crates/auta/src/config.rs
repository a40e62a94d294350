//! Configuration management for auta.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name used under the platform config directory.
const APP_DIR_NAME: &str = "auta";

/// Default database file name, relative to the working directory.
const DATABASE_FILE_NAME: &str = "auta.db";

/// Development signing secret. Anyone who knows it can forge sessions.
pub const DEFAULT_SECRET_KEY: &str = "tajny-klic";

/// Environment variable prefix.
const ENV_PREFIX: &str = "AUTA_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AUTA_`, sections split by `__`)
/// 2. TOML config file at `~/.config/auta/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session cookie configuration.
    pub session: SessionConfig,
    /// Form validation configuration.
    pub validation: ValidationConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind_address: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the `SQLite` database file.
    pub database_path: PathBuf,
}

/// Session cookie configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Secret used to derive the cookie signing key.
    pub secret_key: String,
    /// Name of the session cookie.
    pub cookie_name: String,
}

/// Form validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Use strict price, color and date checks instead of the lax defaults.
    pub strict: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DATABASE_FILE_NAME),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            cookie_name: "session".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(Error::config_validation(format!(
                "bind_address is not a socket address: {}",
                self.server.bind_address
            )));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::config_validation("database_path must not be empty"));
        }

        if self.session.secret_key.is_empty() {
            return Err(Error::config_validation("secret_key must not be empty"));
        }

        if !is_cookie_token(&self.session.cookie_name) {
            return Err(Error::config_validation(format!(
                "invalid cookie_name: {:?}",
                self.session.cookie_name
            )));
        }

        Ok(())
    }

    /// Get the database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage.database_path.clone()
    }

    /// Whether the built-in development secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.session.secret_key == DEFAULT_SECRET_KEY
    }

    /// Get the bind address as a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address does not parse.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server.bind_address.parse().map_err(|_| {
            Error::config_validation(format!(
                "bind_address is not a socket address: {}",
                self.server.bind_address
            ))
        })
    }
}

/// RFC 6265 cookie-name token: visible ASCII without separators.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}
