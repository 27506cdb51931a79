//! Checkpoint data structures
//!
//! The persisted record is a tiny JSON object:
//!
//! ```json
//! {"last_processed_time": 1700000000.25}
//! ```
//!
//! Unknown keys are ignored on read and never written back.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cutoff marking which files have already been processed
///
/// `None` means no checkpoint was ever recorded: every file counts as new,
/// whatever its mtime. It stays distinguishable from an explicit zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Checkpoint {
    last_processed_time: Option<f64>,
}

impl Checkpoint {
    /// No prior checkpoint
    pub const NONE: Checkpoint = Checkpoint {
        last_processed_time: None,
    };

    /// Checkpoint at the given Unix timestamp (seconds)
    pub fn at(unix_secs: f64) -> Self {
        Self {
            last_processed_time: Some(unix_secs),
        }
    }

    /// Recorded timestamp, if any
    pub fn last_processed_time(&self) -> Option<f64> {
        self.last_processed_time
    }

    /// Recorded timestamp, or `0.0` when unset
    pub fn cutoff(&self) -> f64 {
        self.last_processed_time.unwrap_or(0.0)
    }

    /// Lower bound for enumeration: files must be strictly newer than this
    ///
    /// Unset is negative infinity so files stamped at or before 1970 are
    /// still returned on the first scan.
    pub fn since(&self) -> f64 {
        self.last_processed_time.unwrap_or(f64::NEG_INFINITY)
    }

    /// True when nothing was ever recorded
    pub fn is_initial(&self) -> bool {
        self.last_processed_time.is_none()
    }

    /// Decode a persisted record
    ///
    /// `location` only labels the error.
    pub fn decode(bytes: &[u8], location: &str) -> Result<Self> {
        let record: CheckpointRecord =
            serde_json::from_slice(bytes).map_err(|source| Error::Checkpoint {
                location: location.to_string(),
                source,
            })?;

        if record.last_processed_time.is_none() {
            tracing::warn!(location, "Checkpoint record has no last_processed_time, treating as unset");
        }

        Ok(Self {
            last_processed_time: record.last_processed_time,
        })
    }

    /// Encode for persistence
    ///
    /// An unset checkpoint is written as an explicit `0`.
    pub fn encode(&self) -> Vec<u8> {
        let record = CheckpointRecord {
            last_processed_time: Some(self.cutoff()),
        };
        // A struct holding one finite f64 always serializes
        serde_json::to_vec(&record).unwrap_or_default()
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_processed_time {
            Some(ts) => write!(f, "{} ({})", format_timestamp(ts), ts),
            None => f.write_str("none"),
        }
    }
}

/// On-disk shape of a checkpoint
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointRecord {
    #[serde(default)]
    last_processed_time: Option<f64>,
}

/// Format a Unix timestamp as local time ("2024-01-03 14:30:00.250000")
pub fn format_timestamp(unix_secs: f64) -> String {
    let secs = unix_secs.floor();
    let nanos = ((unix_secs - secs) * 1e9).round().min(999_999_999.0) as u32;

    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S%.6f")
            .to_string(),
        None => format!("{unix_secs}"),
    }
}
