//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{ServerConfig, PORT_ENV};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidPort { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidPort { var, value } => {
                write!(f, "{} is not a valid port: {:?}", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides from the process environment, then validate.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ServerConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: ServerConfig, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::InvalidPort {
            var: PORT_ENV,
            value,
        })?;
    }
    Ok(config)
}
