//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (key size, port)
//! - Reject service names the init systems cannot carry
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::AppConfig;

/// Smallest RSA modulus accepted for generated keys.
pub const MIN_RSA_BITS: usize = 2048;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration, reporting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut reject = |field: &'static str, message: String| {
        errors.push(ValidationError { field, message });
    };

    let name = &config.service.name;
    if name.is_empty() {
        reject("service.name", "must not be empty".to_string());
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        reject(
            "service.name",
            format!("'{}' may only contain letters, digits, '.', '_' and '-'", name),
        );
    }

    if config.listener.port == 0 {
        reject("listener.port", "must be non-zero".to_string());
    }

    if config.identity.rsa_bits < MIN_RSA_BITS {
        reject(
            "identity.rsa_bits",
            format!("{} is below the minimum of {}", config.identity.rsa_bits, MIN_RSA_BITS),
        );
    }
    if config.identity.common_name.is_empty() {
        reject("identity.common_name", "must not be empty".to_string());
    }
    if config.identity.ca_common_name.is_empty() {
        reject("identity.ca_common_name", "must not be empty".to_string());
    }

    let paths = &config.paths;
    for (field, path) in [
        ("paths.cert", &paths.cert),
        ("paths.key", &paths.key),
        ("paths.body", &paths.body),
        ("paths.headers_dir", &paths.headers_dir),
    ] {
        if path.as_os_str().is_empty() {
            reject(field, "must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
