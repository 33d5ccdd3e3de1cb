//! Private CA and leaf certificate generation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose, SerialNumber, PKCS_RSA_SHA256,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::config::IdentityConfig;
use crate::identity::{CertificateMaterial, IdentityError};

/// Generate a CA, issue a leaf certificate from it, and write the leaf pair.
///
/// The CA key is discarded once the leaf is signed. The certificate is written
/// before the key, both created with mode 0600.
pub fn generate_pair(
    material: &CertificateMaterial,
    params: &IdentityConfig,
) -> Result<(), IdentityError> {
    let (_, ca_key) = rsa_key_pair(params.rsa_bits)?;

    let mut ca_params = CertificateParams::default();
    ca_params.distinguished_name = common_name(&params.ca_common_name);
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    ca_params.serial_number = Some(SerialNumber::from(params.serial));
    let ca_cert = ca_params.self_signed(&ca_key)?;

    let (leaf_rsa, leaf_key) = rsa_key_pair(params.rsa_bits)?;

    let mut leaf_params = CertificateParams::new(params.subject_alt_names.clone())?;
    leaf_params.distinguished_name = common_name(&params.common_name);
    leaf_params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    leaf_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    leaf_params.serial_number = Some(SerialNumber::from(params.serial));
    let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key)?;

    write_private(&material.cert, leaf_cert.pem().as_bytes())?;

    let key_pem = leaf_rsa
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
    write_private(&material.key, key_pem.as_bytes())?;

    tracing::debug!(
        cert = %material.cert.display(),
        key = %material.key.display(),
        rsa_bits = params.rsa_bits,
        serial = params.serial,
        "Wrote CA-issued certificate and key"
    );
    Ok(())
}

/// Generate an RSA key and hand it to rcgen as a signing key pair.
fn rsa_key_pair(bits: usize) -> Result<(RsaPrivateKey, KeyPair), IdentityError> {
    let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
        .map_err(|source| IdentityError::KeyGeneration { bits, source })?;
    let pkcs8 = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
    let pair = KeyPair::from_pem_and_sign_algo(&pkcs8, &PKCS_RSA_SHA256)?;
    Ok((key, pair))
}

fn common_name(cn: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, cn);
    name
}

/// Create `path` (which must not exist yet) readable and writable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> Result<(), IdentityError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .map_err(|source| IdentityError::Write {
            path: path.to_path_buf(),
            source,
        })
}
