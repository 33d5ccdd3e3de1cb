//! The JSON body served for every request.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

/// Read the body file.
///
/// An absent file is created empty (mode 0600) and served as an empty body.
/// Any other read error is logged and also yields an empty body.
pub async fn load_body(path: &Path) -> Vec<u8> {
    match fs::read(path).await {
        Ok(body) => body,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            create_empty(path).await;
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping body");
            Vec::new()
        }
    }
}

async fn create_empty(path: &Path) {
    tracing::info!(path = %path.display(), "Creating empty body file");

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true);
    #[cfg(unix)]
    options.mode(0o600);

    if let Err(e) = options.open(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Could not create empty body file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("initservices.json");
        std::fs::write(&path, br#"{"serverTime":0}"#).unwrap();

        assert_eq!(load_body(&path).await, br#"{"serverTime":0}"#);
    }

    #[tokio::test]
    async fn absent_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("initservices.json");

        assert!(load_body(&path).await.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn unreadable_body_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(load_body(dir.path()).await.is_empty());
    }
}
