//! Read-access probing for the certificate pair.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::identity::IdentityError;

/// Outcome of probing one file of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The file exists and could be opened for reading.
    Present,
    /// Nothing exists at the path.
    Absent,
}

/// Open `path` for reading and classify the result.
///
/// Only `NotFound` counts as absent. Every other failure (permissions, a
/// non-directory path component, I/O errors) is returned as
/// [`IdentityError::Unreadable`] so it can never be mistaken for a missing file.
pub fn probe(path: &Path) -> Result<Probe, IdentityError> {
    match File::open(path) {
        Ok(_) => Ok(Probe::Present),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Probe::Absent),
        Err(source) => Err(IdentityError::Unreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_is_present() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(probe(file.path()).unwrap(), Probe::Present);
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(probe(&dir.path().join("cert.pem")).unwrap(), Probe::Absent);
    }

    #[test]
    fn other_errors_are_not_absent() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file used as a directory component fails with ENOTDIR.
        let err = probe(&file.path().join("cert.pem")).unwrap_err();
        assert!(matches!(err, IdentityError::Unreadable { .. }));
    }
}
