use std::path::{Path, PathBuf};

use crate::config::ServerConfig;
use crate::http::request::strip_query;

pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing exists at the decoded path.
    #[error("path does not exist")]
    NotFound,
    /// The canonical path lies outside the document root.
    #[error("path escapes the document root")]
    Forbidden,
    /// The path could not be decoded.
    #[error("malformed percent-encoding in path")]
    Invalid,
}

/// A request path mapped onto the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Canonical location; always the document root or below it.
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Maps `request_path` to a canonical location inside the document root.
///
/// The query string and fragment are dropped and the rest is percent-decoded
/// before it is joined onto the root. The joined path has to exist for
/// canonicalization to succeed, so a missing file is `NotFound` even when the
/// request also tried to climb out of the root. Only an existing path that
/// canonicalizes outside the root is `Forbidden`.
pub async fn resolve(config: &ServerConfig, request_path: &str) -> Result<ResolvedTarget, ResolveError> {
    let decoded = url_decode(strip_query(request_path))?;
    let start = decoded.iter().position(|&b| b != b'/').unwrap_or(decoded.len());
    let candidate = config.root_requested().join(bytes_to_path(&decoded[start..])?);

    let canonical = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(|_| ResolveError::NotFound)?;
    ensure_contained(config, &canonical, request_path)?;

    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|_| ResolveError::NotFound)?;

    Ok(ResolvedTarget {
        path: canonical,
        is_directory: metadata.is_dir(),
    })
}

/// Looks for an `index.html` regular file in the resolved directory `dir`.
///
/// The index goes through the same containment check as any other target, so
/// a symlinked `index.html` pointing outside the root is `Forbidden`. A
/// missing index, or one that is not a regular file, is `Ok(None)`.
pub async fn resolve_index(config: &ServerConfig, dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
    let Ok(canonical) = tokio::fs::canonicalize(dir.join(INDEX_FILE)).await else {
        return Ok(None);
    };
    ensure_contained(config, &canonical, INDEX_FILE)?;

    match tokio::fs::metadata(&canonical).await {
        Ok(metadata) if metadata.is_file() => Ok(Some(canonical)),
        _ => Ok(None),
    }
}

fn ensure_contained(config: &ServerConfig, canonical: &Path, request_path: &str) -> Result<(), ResolveError> {
    if canonical.starts_with(config.root_canonical()) {
        return Ok(());
    }
    tracing::warn!(
        request_path,
        resolved = %canonical.display(),
        "rejected path outside document root"
    );
    Err(ResolveError::Forbidden)
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> Result<&Path, ResolveError> {
    use std::os::unix::ffi::OsStrExt;
    Ok(Path::new(std::ffi::OsStr::from_bytes(bytes)))
}

// Non-unix paths must be valid UTF-8.
#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> Result<&Path, ResolveError> {
    std::str::from_utf8(bytes)
        .map(Path::new)
        .map_err(|_| ResolveError::Invalid)
}

/// Decodes `%XX` escapes and turns `+` into a space.
///
/// A `%` that is not followed by two hex digits makes the whole path invalid;
/// nothing is partially decoded.
pub fn url_decode(url: &str) -> Result<Vec<u8>, ResolveError> {
    let url = url.as_bytes();
    let mut decoded = Vec::with_capacity(url.len());
    let mut i = 0;
    while i < url.len() {
        match url[i] {
            b'%' => {
                let (hi, lo) = match (url.get(i + 1), url.get(i + 2)) {
                    (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                        (hi, lo)
                    }
                    _ => return Err(ResolveError::Invalid),
                };
                decoded.push(hex_to_digit(hi) * 16 + hex_to_digit(lo));
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            c => {
                decoded.push(c);
                i += 1;
            }
        }
    }
    Ok(decoded)
}

/// Convert hex digit to integer.
fn hex_to_digit(hex: u8) -> u8 {
    if (b'A'..=b'F').contains(&hex) {
        hex - b'A' + 10
    } else if (b'a'..=b'f').contains(&hex) {
        hex - b'a' + 10
    } else {
        hex - b'0'
    }
}
