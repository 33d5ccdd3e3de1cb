//! TLS identity bootstrap.
//!
//! # Data Flow
//! ```text
//! cert path, key path
//!     → probe.rs (Present / Absent / Unreadable per file)
//!     → pair policy (both present, both absent, inconsistent)
//!     → generate.rs (CA + leaf, only when both are absent)
//!     → net::tls loads the pair before the listener binds
//! ```
//!
//! # Design Decisions
//! - Runs once, sequentially, before any socket is opened
//! - A half-present pair is never repaired; the operator must intervene
//! - Existing material is never rewritten (no rotation)

pub mod generate;
pub mod probe;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::IdentityConfig;

pub use generate::generate_pair;
pub use probe::{probe, Probe};

/// The certificate and private key files served by the TLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateMaterial {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertificateMaterial {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }
}

/// What [`ensure_ready`] did to make the pair usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    /// Both files were already present.
    Existing,
    /// Both files were absent and have been generated.
    Generated,
}

/// Errors raised while checking or provisioning the TLS identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Error reading {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing key file {} for cert {}", .key.display(), .cert.display())]
    MissingKey { cert: PathBuf, key: PathBuf },

    #[error("Missing cert file {} for key {}", .cert.display(), .key.display())]
    MissingCertificate { cert: PathBuf, key: PathBuf },

    #[error("Could not generate {bits}-bit RSA key: {source}")]
    KeyGeneration {
        bits: usize,
        #[source]
        source: rsa::Error,
    },

    #[error("Could not encode private key: {0}")]
    KeyEncoding(String),

    #[error("Could not issue certificate: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error("Could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
}

/// Make sure a usable certificate/key pair exists, generating one if both are absent.
pub fn ensure_ready(
    material: &CertificateMaterial,
    params: &IdentityConfig,
) -> Result<Provisioning, IdentityError> {
    let cert = probe(&material.cert)?;
    let key = probe(&material.key)?;

    let provisioning = match (cert, key) {
        (Probe::Present, Probe::Present) => {
            inspect(material)?;
            Provisioning::Existing
        }
        (Probe::Absent, Probe::Absent) => {
            tracing::info!(
                cert = %material.cert.display(),
                key = %material.key.display(),
                "No certificate or key; generating..."
            );
            generate_pair(material, params)?;
            Provisioning::Generated
        }
        (Probe::Present, Probe::Absent) => {
            return Err(IdentityError::MissingKey {
                cert: material.cert.clone(),
                key: material.key.clone(),
            })
        }
        (Probe::Absent, Probe::Present) => {
            return Err(IdentityError::MissingCertificate {
                cert: material.cert.clone(),
                key: material.key.clone(),
            })
        }
    };

    tracing::info!(
        cert = %material.cert.display(),
        key = %material.key.display(),
        ?provisioning,
        "Certificate and key present"
    );
    Ok(provisioning)
}

/// Check that both files decode as the PEM blocks the listener expects.
pub fn inspect(material: &CertificateMaterial) -> Result<(), IdentityError> {
    let mut certs = open_pem(&material.cert)?;
    let found = rustls_pemfile::certs(&mut certs)
        .next()
        .transpose()
        .map_err(|e| load_error(&material.cert, e.to_string()))?;
    if found.is_none() {
        return Err(load_error(&material.cert, "no CERTIFICATE block found"));
    }

    let mut key = open_pem(&material.key)?;
    match rustls_pemfile::private_key(&mut key) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(load_error(&material.key, "no private key block found")),
        Err(e) => Err(load_error(&material.key, e.to_string())),
    }
}

fn open_pem(path: &Path) -> Result<BufReader<File>, IdentityError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IdentityError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

fn load_error(path: &Path, reason: impl Into<String>) -> IdentityError {
    IdentityError::Load {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
