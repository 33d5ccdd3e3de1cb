//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the responder.
//! All types derive Serde traits for deserialization from config files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration for the initservices responder.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// On-disk locations of the TLS pair, body file and header directory.
    pub paths: PathsConfig,

    /// Identity of the installable system service.
    pub service: ServiceConfig,

    /// Listener settings.
    pub listener: ListenerConfig,

    /// Parameters for generating the TLS identity.
    pub identity: IdentityConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// File locations used by the responder.
///
/// Relative entries are resolved against `base_dir`, or against the
/// directory holding the running executable when `base_dir` is unset.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory relative paths are resolved against.
    pub base_dir: Option<PathBuf>,

    /// Certificate file (PEM).
    pub cert: PathBuf,

    /// Private key file (PEM).
    pub key: PathBuf,

    /// JSON response body.
    pub body: PathBuf,

    /// Directory of single-line header files.
    pub headers_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            cert: PathBuf::from("cert.pem"),
            key: PathBuf::from("key.pem"),
            body: PathBuf::from("initservices.json"),
            headers_dir: PathBuf::from("initservices.headers"),
        }
    }
}

impl PathsConfig {
    /// Return a copy with every relative path joined onto `dir`.
    ///
    /// `base_dir` from the file, when present, takes precedence over `dir`.
    pub fn resolve_against(&self, dir: &Path) -> ResolvedPaths {
        let base = self.base_dir.as_deref().unwrap_or(dir);
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        ResolvedPaths {
            cert: join(&self.cert),
            key: join(&self.key),
            body: join(&self.body),
            headers_dir: join(&self.headers_dir),
        }
    }
}

/// Absolute file locations, ready for use by the identity and http layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub body: PathBuf,
    pub headers_dir: PathBuf,
}

/// Service registration identity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name used by the OS service manager.
    pub name: String,

    /// Human-readable name.
    pub display_name: String,

    /// Longer description written into the unit or script.
    pub description: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "lgtv-sdp".to_string(),
            display_name: "LG TV SDP Spoofer".to_string(),
            description: "LG TV network time and configuration server".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port the TLS listener binds on the configured address.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { port: 443 }
    }
}

/// Parameters for the self-signed identity generated on first run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// RSA modulus size for both the CA and the leaf key.
    pub rsa_bits: usize,

    /// Common name of the private CA.
    pub ca_common_name: String,

    /// Common name of the leaf certificate.
    pub common_name: String,

    /// DNS subject alternative names for the leaf certificate.
    pub subject_alt_names: Vec<String>,

    /// Serial number stamped on both certificates.
    pub serial: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            rsa_bits: 4096,
            ca_common_name: "initservices CA".to_string(),
            common_name: "initservices".to_string(),
            subject_alt_names: Vec::new(),
            serial: 2020,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,

    /// Output format: `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
