//! Shared utilities for integration tests.

use std::path::{Path, PathBuf};

use initservices_responder::config::{IdentityConfig, ServiceConfig};
use initservices_responder::identity::CertificateMaterial;
use initservices_responder::service::{HostPlatform, ServiceDescriptor};

/// Identity parameters with a key size that keeps tests fast.
#[allow(dead_code)]
pub fn fast_identity() -> IdentityConfig {
    IdentityConfig {
        rsa_bits: 2048,
        ..IdentityConfig::default()
    }
}

#[allow(dead_code)]
pub fn material_in(dir: &Path) -> CertificateMaterial {
    CertificateMaterial::new(dir.join("cert.pem"), dir.join("key.pem"))
}

/// The descriptor `-s install 192.168.1.20` would build on `platform`.
#[allow(dead_code)]
pub fn descriptor_for(platform: HostPlatform) -> ServiceDescriptor {
    ServiceDescriptor::new(
        &ServiceConfig::default(),
        PathBuf::from("/opt/sdp/initservices-responder"),
        PathBuf::from("/opt/sdp"),
        Some("192.168.1.20".parse().unwrap()),
        None,
        platform.script_template(),
    )
}
