//! URI ↔ filesystem path conversion and normalization.
//!
//! The workspace keys files by canonical `file://` URIs. Conversion is
//! percent-decoding aware and handles Windows drive letters and UNC
//! paths; non-`file` schemes are rejected with a typed error at the
//! server boundary.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Conversion failures surfaced to the LSP façade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("not a valid URI: {0}")]
    Invalid(String),
    #[error("unsupported URI scheme `{0}`; only file:// is supported")]
    UnsupportedScheme(String),
    #[error("URI has no usable filesystem path: {0}")]
    NoPath(String),
}

/// Convert a `file://` URI to a filesystem path.
///
/// Percent-encoded bytes are decoded; `file:///C:/…` and `file:///c/…`
/// drive forms and `file:////host/share/…` UNC forms are accepted.
pub fn uri_to_path(uri: &str) -> Result<PathBuf, UriError> {
    let url = Url::parse(uri).map_err(|_| UriError::Invalid(uri.to_string()))?;
    if url.scheme() != "file" {
        return Err(UriError::UnsupportedScheme(url.scheme().to_string()));
    }
    if let Ok(path) = url.to_file_path() {
        return Ok(path);
    }
    // `file:////host/share` and other shapes url rejects on some
    // platforms: fall back to the decoded path portion.
    let decoded = percent_decode(url.path());
    if decoded.is_empty() {
        return Err(UriError::NoPath(uri.to_string()));
    }
    // `file:///c/foo` drive shorthand.
    let bytes = decoded.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b'/' {
        let drive = bytes[1].to_ascii_lowercase() as char;
        return Ok(PathBuf::from(format!("{drive}:{}", &decoded[2..])));
    }
    Ok(PathBuf::from(decoded))
}

/// Convert a filesystem path to a `file://` URI.
pub fn path_to_uri(path: &Path) -> Result<String, UriError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| UriError::NoPath(e.to_string()))?
            .join(path)
    };
    let normalized = normalize_path(&absolute);
    Url::from_file_path(&normalized)
        .map(|url| url.to_string())
        .map_err(|_| UriError::NoPath(normalized.display().to_string()))
}

/// Normalize a URI into a consistent lookup key: parsed form with
/// Windows drive letters lowercased.
pub fn uri_key(uri: &str) -> String {
    let Ok(url) = Url::parse(uri) else {
        return uri.to_string();
    };
    let s = url.to_string();
    if let Some(rest) = s.strip_prefix("file:///") {
        let bytes = rest.as_bytes();
        if bytes.len() > 1
            && bytes[0].is_ascii_alphabetic()
            && (bytes[1] == b':' || rest[1..].starts_with("%3A"))
        {
            let mut out = String::from("file:///");
            out.push(bytes[0].to_ascii_lowercase() as char);
            out.push_str(&rest[1..]);
            return out.replace("%3A", ":");
        }
    }
    s
}

/// Whether a URI uses the `file` scheme.
pub fn is_file_uri(uri: &str) -> bool {
    Url::parse(uri).map(|u| u.scheme() == "file").unwrap_or(false)
}

/// Lexically normalize a path: fold `.` and `..` components without
/// touching the filesystem, so open-but-unsaved files normalize the same
/// way as on-disk files.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &input[i + 1..i + 3];
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain_path() {
        let uri = path_to_uri(Path::new("/tmp/project/main.lang")).unwrap();
        assert_eq!(uri, "file:///tmp/project/main.lang");
        assert_eq!(uri_to_path(&uri).unwrap(), PathBuf::from("/tmp/project/main.lang"));
    }

    #[test]
    fn percent_decoding() {
        let path = uri_to_path("file:///tmp/with%20space/a.lang").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/with space/a.lang"));
    }

    #[test]
    fn windows_drive_letters() {
        assert_eq!(uri_key("file:///C:/src/a.lang"), "file:///c:/src/a.lang");
        assert_eq!(uri_key("file:///c/src/a.lang"), "file:///c/src/a.lang");
    }

    #[test]
    fn non_file_scheme_rejected() {
        assert_eq!(
            uri_to_path("untitled:Untitled-1").unwrap_err(),
            UriError::UnsupportedScheme("untitled".to_string())
        );
        assert!(matches!(uri_to_path("https://example.com/x"), Err(UriError::UnsupportedScheme(_))));
    }

    #[test]
    fn invalid_uri_rejected() {
        assert!(matches!(uri_to_path("not a uri"), Err(UriError::Invalid(_))));
    }

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.lang")),
            PathBuf::from("/a/c/d.lang")
        );
    }

    #[test]
    fn key_is_stable_for_plain_uris() {
        assert_eq!(uri_key("file:///tmp/a.lang"), "file:///tmp/a.lang");
        assert_eq!(uri_key("not-a-uri"), "not-a-uri");
    }

    #[test]
    fn existing_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.lang");
        std::fs::write(&file, "int x = 1;").unwrap();
        let uri = path_to_uri(&file).unwrap();
        let back = uri_to_path(&uri).unwrap();
        assert_eq!(std::fs::read_to_string(back).unwrap(), "int x = 1;");
    }
}
