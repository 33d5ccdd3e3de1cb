//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;

use crate::identity::CertificateMaterial;

/// Load the provisioned certificate and key into a rustls server config.
///
/// The pair has already been checked by identity bootstrap; errors here mean
/// the files changed in between or rustls rejected the key.
pub async fn load_tls_config(material: &CertificateMaterial) -> Result<RustlsConfig, std::io::Error> {
    tracing::debug!(
        cert = %material.cert.display(),
        key = %material.key.display(),
        "Loading TLS certificate"
    );
    RustlsConfig::from_pem_file(&material.cert, &material.key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let material = CertificateMaterial::new(dir.path().join("cert.pem"), dir.path().join("key.pem"));
        assert!(load_tls_config(&material).await.is_err());
    }
}
