use std::net::{IpAddr, SocketAddr};

use hyper::Uri;

use crate::config::models::{ExplorerConfig, UpstreamConfig};

/// Most decimal places an amount can be scaled by
const MAX_DECIMAL_PLACES: u32 = 38;

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Explorer configuration validator
pub struct ServerConfigValidator;

impl ServerConfigValidator {
    /// Validate the entire configuration, reporting every problem found
    pub fn validate(config: &ExplorerConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        for (i, entry) in config.whitelist.iter().enumerate() {
            if entry.trim().parse::<IpAddr>().is_err() {
                errors.push(ValidationError::InvalidField {
                    field: format!("whitelist[{i}]"),
                    message: format!("'{entry}' is not an IP address"),
                });
            }
        }

        if config.restart_interval_ms == 0 {
            errors.push(Self::must_be_positive("restart_interval_ms"));
        }
        if config.acl_refresh_interval_ms == 0 {
            errors.push(Self::must_be_positive("acl_refresh_interval_ms"));
        }
        if config.drain_timeout_ms == 0 {
            errors.push(Self::must_be_positive("drain_timeout_ms"));
        }

        if config.amount.decimal_places > MAX_DECIMAL_PLACES {
            errors.push(ValidationError::InvalidField {
                field: "amount.decimal_places".to_string(),
                message: format!("must be at most {MAX_DECIMAL_PLACES}"),
            });
        }

        if config.native_asset.label.trim().is_empty() {
            errors.push(ValidationError::InvalidField {
                field: "native_asset.label".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if let Some(upstream) = &config.upstream {
            errors.extend(Self::validate_upstream(upstream));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:8888' or '0.0.0.0:8888')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_upstream(upstream: &UpstreamConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let field = "upstream.url".to_string();

        match upstream.url.parse::<Uri>() {
            Ok(uri) => {
                if uri.scheme_str() != Some("http") {
                    errors.push(ValidationError::InvalidField {
                        field: field.clone(),
                        message: format!(
                            "URL scheme must be 'http', got '{}'",
                            uri.scheme_str().unwrap_or("")
                        ),
                    });
                }
                if uri.host().is_none() {
                    errors.push(ValidationError::InvalidField {
                        field,
                        message: "URL must have a valid host".to_string(),
                    });
                }
            }
            Err(e) => errors.push(ValidationError::InvalidField {
                field,
                message: format!("Invalid URL format: {e}"),
            }),
        }

        if upstream.timeout_secs == 0 {
            errors.push(Self::must_be_positive("upstream.timeout_secs"));
        }
        errors
    }

    fn must_be_positive(field: &str) -> ValidationError {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        }
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}
