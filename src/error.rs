//! Crate-wide error type.
//!
//! Each subsystem keeps its own error enum; `AppError` only aggregates them so
//! `main` has a single place that turns failures into an exit code.

use thiserror::Error;

use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::lifecycle::ServeError;
use crate::service::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Serve(#[from] ServeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_pass_through() {
        let err = AppError::from(ServiceError::NotInstalled {
            name: "lgtv-sdp".to_string(),
        });
        assert_eq!(err.to_string(), "Service lgtv-sdp is not installed");
    }
}
