//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Validate addresses that are parsed later at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Listener host is empty.
    EmptyHost,
    /// Listener port is zero.
    ZeroPort,
    /// A duration that must be positive is zero.
    ZeroDuration(&'static str),
    /// Metrics are enabled but the address does not parse.
    InvalidMetricsAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyHost => write!(f, "listener.host must not be empty"),
            ValidationError::ZeroPort => write!(f, "listener.port must not be 0"),
            ValidationError::ZeroDuration(field) => write!(f, "{} must be greater than 0", field),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address {:?} is not a socket address", addr)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::ZeroDuration("shutdown.grace_period_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.request_secs"));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ServerConfig::default();
        config.listener.port = 0;
        config.shutdown.grace_period_secs = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::ZeroDuration("shutdown.grace_period_secs"),
                ValidationError::InvalidMetricsAddress("not-an-address".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
