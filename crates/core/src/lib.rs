//! Core types for Tidemark incremental scans
//!
//! This crate provides:
//! - Storage locations (local paths vs `s3://` addresses)
//! - The checkpoint record and its JSON codec
//! - File records produced by enumeration
//! - Injectable clocks
//! - Session configuration and error types

pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod error;
pub mod location;
pub mod record;

// Re-exports
pub use checkpoint::{format_timestamp, Checkpoint};
pub use clock::{unix_seconds, Clock, ManualClock, SystemClock};
pub use config::{CommitMode, SessionConfig, StoreConfig};
pub use error::{BoxError, ConfigError, Error, Result};
pub use location::{object_uri, Location, ObjectAddress, Target};
pub use record::{FileRecord, FileRef};
