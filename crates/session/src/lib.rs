//! Incremental scan sessions
//!
//! A [`Session`] loads the checkpoint once, lists files newer than it as often
//! as the caller likes, and commits a new checkpoint when told to:
//!
//! ```no_run
//! use session::Session;
//!
//! # fn main() -> tidemark_core::Result<()> {
//! let mut session = Session::builder("/data/incoming", "/data/_state/cp.json").build()?;
//! for file in session.get_new_files()? {
//!     println!("{}", file.identifier());
//! }
//! // Only after the files above are durably processed
//! session.commit_checkpoint()?;
//! # Ok(())
//! # }
//! ```
//!
//! Committing is not tied to processing. Committing before the returned
//! files are handled drops them from every later scan.

mod session;

pub use session::{Session, SessionBuilder, SessionState};

// Re-exports so callers only need this crate
pub use backend::ObjectStoreBackend;
pub use tidemark_core::{
    format_timestamp, Checkpoint, Clock, CommitMode, ConfigError, Error, FileRecord, FileRef,
    Location, ManualClock, Result, SessionConfig, StoreConfig, SystemClock,
};
