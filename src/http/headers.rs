//! Operator-supplied response headers.
//!
//! Each regular file in the header directory becomes one header: the file
//! name is the header name and the contents, minus one trailing newline, the
//! value. The directory is re-read on every request so edits take effect
//! without a restart.

use std::io::ErrorKind;
use std::path::Path;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tokio::fs;

/// Read every header file in `dir`.
///
/// Never fails: an absent directory is created empty, anything unreadable or
/// not a valid header is skipped with a log line.
pub async fn load_headers(dir: &Path) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            create_header_dir(dir).await;
            return headers;
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Skipping custom headers");
            return headers;
        }
    };

    let mut files = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => files.push(entry),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Could not list header directory");
                break;
            }
        }
    }
    files.sort_by_key(|entry| entry.file_name());

    for entry in files {
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.file_type().await {
            Ok(kind) if kind.is_file() => {}
            _ => {
                tracing::debug!(header = %name, "Skipping non-file header entry");
                continue;
            }
        }

        let value = match fs::read(entry.path()).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(header = %name, error = %e, "Skipping header");
                continue;
            }
        };

        match parse_header(&name, &value) {
            Some((name, value)) => {
                headers.append(name, value);
            }
            None => tracing::warn!(header = %name, "Skipping invalid header"),
        }
    }

    headers
}

/// Turn a file name and its raw contents into a header pair.
///
/// Values are sent as stored; they need not be UTF-8.
pub fn parse_header(name: &str, contents: &[u8]) -> Option<(HeaderName, HeaderValue)> {
    let value = contents.strip_suffix(b"\n").unwrap_or(contents);
    let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
    let value = HeaderValue::from_bytes(value).ok()?;
    Some((name, value))
}

async fn create_header_dir(dir: &Path) {
    tracing::info!(dir = %dir.display(), "Creating header directory");

    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(0o755);

    if let Err(e) = builder.create(dir).await {
        tracing::warn!(dir = %dir.display(), error = %e, "Could not create header directory");
    }
}
