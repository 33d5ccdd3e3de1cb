//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve data file locations
//! - Provision the TLS identity before any listener exists
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Runs synchronously; nothing else is running yet

use crate::config::{executable_dir, AppConfig, ResolvedPaths};
use crate::error::AppError;
use crate::identity::{ensure_ready, CertificateMaterial};

/// Resolve paths against `paths.base_dir`, or the executable's directory.
pub fn resolve_paths(config: &AppConfig) -> Result<ResolvedPaths, AppError> {
    let dir = match &config.paths.base_dir {
        Some(dir) => dir.clone(),
        None => executable_dir()?,
    };
    Ok(config.paths.resolve_against(&dir))
}

/// Everything that must succeed before the listener binds.
pub fn prepare(config: &AppConfig) -> Result<ResolvedPaths, AppError> {
    let paths = resolve_paths(config)?;
    tracing::debug!(?paths, "Resolved data paths");

    ensure_ready(&certificate_material(&paths), &config.identity)?;
    Ok(paths)
}

pub fn certificate_material(paths: &ResolvedPaths) -> CertificateMaterial {
    CertificateMaterial::new(&paths.cert, &paths.key)
}
