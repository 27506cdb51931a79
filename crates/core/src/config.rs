//! Session configuration
//!
//! Usually built in code, but can also be loaded from a TOML file:
//!
//! ```toml
//! path = "s3://ingest/incoming/"
//! checkpoint_path = "s3://ingest/_state/incoming.json"
//! commit_mode = "wall_clock"
//!
//! [store]
//! endpoint_url = "http://localhost:9000"
//! access_key = "minio"
//! secret_key = "minio123"
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// How `commit_checkpoint` picks the new checkpoint value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Current time at commit (files landing mid-scan can be skipped)
    #[default]
    WallClock,
    /// Newest modification time among files returned this session
    MaxSeenMtime,
}

impl std::str::FromStr for CommitMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wall_clock" | "wall-clock" => Ok(CommitMode::WallClock),
            "max_seen_mtime" | "max-seen-mtime" => Ok(CommitMode::MaxSeenMtime),
            other => Err(ConfigError::Invalid {
                key: "commit_mode".to_string(),
                reason: format!("expected 'wall_clock' or 'max_seen_mtime', got '{other}'"),
            }),
        }
    }
}

/// Object store client settings for S3-compatible deployments
///
/// When absent the client resolves credentials from the environment.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Custom endpoint, e.g. a MinIO server
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    /// Permit plain-HTTP endpoints (defaults to true for `http://` endpoints)
    pub allow_http: Option<bool>,
    /// Per-request timeout; client default when unset
    pub timeout_secs: Option<u64>,
    /// Retry count handed to the client; client default when unset
    pub max_retries: Option<usize>,
}

impl StoreConfig {
    /// Custom endpoint with static credentials
    pub fn with_endpoint(
        endpoint_url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Whether plain HTTP should be allowed for this endpoint
    pub fn allows_http(&self) -> bool {
        self.allow_http.unwrap_or_else(|| {
            self.endpoint_url
                .as_deref()
                .is_some_and(|url| url.starts_with("http://"))
        })
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint_url {
            let url = Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
                key: "store.endpoint_url".to_string(),
                reason: e.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid {
                    key: "store.endpoint_url".to_string(),
                    reason: format!("expected http or https, got '{}'", url.scheme()),
                });
            }
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(ConfigError::Invalid {
                key: "store.access_key".to_string(),
                reason: "access_key and secret_key must be set together".to_string(),
            });
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                key: "store.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("allow_http", &self.allow_http)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Everything needed to open a scan session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Data root to scan
    pub path: String,
    /// Where the checkpoint record lives
    pub checkpoint_path: String,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub commit_mode: CommitMode,
}

impl SessionConfig {
    pub fn new(path: impl Into<String>, checkpoint_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            checkpoint_path: checkpoint_path.into(),
            store: None,
            commit_mode: CommitMode::default(),
        }
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: SessionConfig = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.checkpoint_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "checkpoint_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(store) = &self.store {
            store.validate()?;
        }
        Ok(())
    }
}

/// Annotated example config
pub fn example_config() -> &'static str {
    r#"# Tidemark configuration

# Data root: local path, file:// URL, or s3:// / s3a:// bucket prefix
path = "s3://ingest/incoming/"

# Checkpoint record: local path or object key
checkpoint_path = "s3://ingest/_state/incoming.json"

# "wall_clock" (default) or "max_seen_mtime"
commit_mode = "wall_clock"

# Omit this table to resolve credentials from AWS_* environment variables
[store]
endpoint_url = "http://localhost:9000"
access_key = "minio"
secret_key = "minio123"
# region = "us-east-1"
# timeout_secs = 30
# max_retries = 3
"#
}
