//! Storage locator
//!
//! Classifies a path string as a local filesystem path or an object store
//! address. Parsing never fails: unusable inputs are kept as
//! [`Target::Unsupported`] or [`Target::Invalid`] and only turn into errors
//! when an operation actually needs the location.

use crate::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// URI scheme used for every object store identifier we produce
pub const OBJECT_SCHEME: &str = "s3";

/// Schemes accepted as object store addresses
const OBJECT_SCHEMES: &[&str] = &["s3", "s3a"];

/// Bucket plus key (or key prefix) inside an object store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectAddress {
    pub bucket: String,
    pub key: String,
}

impl ObjectAddress {
    /// Fully-qualified `s3://bucket/key` URI
    pub fn uri(&self) -> String {
        object_uri(&self.bucket, &self.key)
    }
}

/// What a location resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Local filesystem path
    Local(PathBuf),
    /// Object store bucket and key/prefix
    ObjectStore(ObjectAddress),
    /// Scheme we do not handle
    Unsupported(String),
    /// Recognized scheme with an unusable address
    Invalid(String),
}

/// A parsed storage location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    raw: String,
    target: Target,
}

impl Location {
    /// Parse a filesystem path or URI
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let target = classify(&raw);
        Self { raw, target }
    }

    /// The string this location was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_local(&self) -> bool {
        matches!(self.target, Target::Local(_))
    }

    pub fn is_object_store(&self) -> bool {
        matches!(self.target, Target::ObjectStore(_))
    }

    /// Local path, if this is a local location
    pub fn local_path(&self) -> Option<&Path> {
        match &self.target {
            Target::Local(path) => Some(path),
            _ => None,
        }
    }

    /// Object address, if this is an object store location
    pub fn object_address(&self) -> Option<&ObjectAddress> {
        match &self.target {
            Target::ObjectStore(addr) => Some(addr),
            _ => None,
        }
    }

    /// Fail with a configuration error unless the location is usable
    pub fn ensure_supported(&self) -> Result<(), ConfigError> {
        match &self.target {
            Target::Local(_) | Target::ObjectStore(_) => Ok(()),
            Target::Unsupported(scheme) => Err(ConfigError::UnsupportedScheme {
                scheme: scheme.clone(),
                path: self.raw.clone(),
            }),
            Target::Invalid(reason) => Err(ConfigError::InvalidLocation {
                path: self.raw.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Render `s3://bucket/key`
pub fn object_uri(bucket: &str, key: &str) -> String {
    format!("{}://{}/{}", OBJECT_SCHEME, bucket, key)
}

fn classify(raw: &str) -> Target {
    // Relative paths and bare absolute paths are not URLs
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return Target::Local(PathBuf::from(raw)),
    };

    let scheme = url.scheme();
    if OBJECT_SCHEMES.contains(&scheme) {
        return object_target(raw, &url);
    }
    if scheme == "file" {
        return Target::Local(file_url_path(&url));
    }
    if cfg!(windows) && scheme.len() == 1 {
        // C:\data parses as scheme "c"
        return Target::Local(PathBuf::from(raw));
    }
    Target::Unsupported(scheme.to_string())
}

/// Keys are taken verbatim from `raw`: `Url::path` would percent-encode
/// them and cut them at `?` or `#`.
fn object_target(raw: &str, url: &Url) -> Target {
    let bucket = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Target::Invalid("missing bucket name".to_string()),
    };
    let key = raw
        .split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map_or("", |(_, key)| key)
        .trim_start_matches('/')
        .to_string();
    Target::ObjectStore(ObjectAddress { bucket, key })
}

fn file_url_path(url: &Url) -> PathBuf {
    url.to_file_path()
        .unwrap_or_else(|_| PathBuf::from(url.path()))
}
