//! Session state machine

use backend::{Backends, ObjectStoreBackend};
use std::sync::Arc;
use tidemark_core::{
    format_timestamp, Checkpoint, Clock, CommitMode, FileRecord, Location, Result,
    SessionConfig, StoreConfig, SystemClock,
};
use tracing::{debug, info};

/// Last operation performed on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Checkpoint loaded, nothing listed yet
    Initialized,
    /// New files listed at least once
    Scanned,
    /// New checkpoint persisted
    Committed,
}

/// One incremental scan over a data root
///
/// The checkpoint is read once at construction; every `get_new_files` call
/// compares against that value, even after a commit. Not meant to be shared
/// between threads or with a second writer of the same checkpoint.
pub struct Session {
    data: Location,
    checkpoint_location: Location,
    backends: Backends,
    clock: Arc<dyn Clock>,
    commit_mode: CommitMode,
    checkpoint: Checkpoint,
    committed: Option<Checkpoint>,
    max_seen: Option<f64>,
    state: SessionState,
}

impl Session {
    /// Open a session with the system clock
    pub fn open(config: SessionConfig) -> Result<Self> {
        SessionBuilder::from_config(config).build()
    }

    pub fn builder(path: impl Into<String>, checkpoint_path: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(path, checkpoint_path)
    }

    /// Files modified strictly after the loaded checkpoint
    ///
    /// Re-lists the backend on every call.
    pub fn get_new_files(&mut self) -> Result<Vec<FileRecord>> {
        let since = self.checkpoint.since();
        let backend = self.backends.resolve(&self.data)?;
        let files = backend.list_new_files(&self.data, since)?;

        if let Some(newest) = files.iter().map(|f| f.modified_time).reduce(f64::max) {
            self.max_seen = Some(self.max_seen.map_or(newest, |seen| seen.max(newest)));
        }
        self.state = SessionState::Scanned;

        debug!(
            path = %self.data,
            backend = backend.name(),
            since,
            found = files.len(),
            "Listed new files"
        );
        Ok(files)
    }

    /// Persist a new checkpoint and return it
    ///
    /// Independent of `get_new_files`: only call this once the files from the
    /// last listing are durably processed.
    pub fn commit_checkpoint(&mut self) -> Result<Checkpoint> {
        let value = match self.commit_mode {
            CommitMode::WallClock => self.clock.now(),
            CommitMode::MaxSeenMtime => match self.max_seen {
                Some(seen) => seen.max(self.checkpoint.since()),
                None => self.checkpoint.cutoff(),
            },
        };
        let checkpoint = Checkpoint::at(value);

        self.backends
            .resolve(&self.checkpoint_location)?
            .commit_checkpoint(&self.checkpoint_location, &checkpoint)?;

        info!(
            location = %self.checkpoint_location,
            last_processed_time = value,
            "Checkpoint updated to: {}",
            format_timestamp(value)
        );

        self.committed = Some(checkpoint);
        self.state = SessionState::Committed;
        Ok(checkpoint)
    }

    /// Checkpoint loaded at construction
    pub fn last_checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    /// Checkpoint written by the latest commit, if any
    pub fn last_committed(&self) -> Option<Checkpoint> {
        self.committed
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    pub fn data_location(&self) -> &Location {
        &self.data
    }

    pub fn checkpoint_location(&self) -> &Location {
        &self.checkpoint_location
    }
}

/// Builder for [`Session`]
pub struct SessionBuilder {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    object_store: Option<ObjectStoreBackend>,
}

impl SessionBuilder {
    pub fn new(path: impl Into<String>, checkpoint_path: impl Into<String>) -> Self {
        Self::from_config(SessionConfig::new(path, checkpoint_path))
    }

    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            object_store: None,
        }
    }

    /// Custom object store endpoint and credentials
    pub fn store_config(mut self, store: StoreConfig) -> Self {
        self.config.store = Some(store);
        self
    }

    pub fn commit_mode(mut self, mode: CommitMode) -> Self {
        self.config.commit_mode = mode;
        self
    }

    /// Time source for wall-clock commits
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use this object store backend instead of building one from config
    pub fn object_store(mut self, backend: ObjectStoreBackend) -> Self {
        self.object_store = Some(backend);
        self
    }

    /// Build backends and load the checkpoint
    pub fn build(self) -> Result<Session> {
        self.config.validate()?;

        let data = Location::parse(self.config.path.as_str());
        let checkpoint_location = Location::parse(self.config.checkpoint_path.as_str());

        let backends = match self.object_store {
            Some(object) => Backends::local_only().with_object_store(object),
            None => Backends::for_locations(
                &[&data, &checkpoint_location],
                self.config.store.as_ref(),
            )?,
        };

        let checkpoint = backends
            .resolve(&checkpoint_location)?
            .load_checkpoint(&checkpoint_location)?;

        info!(
            path = %data,
            checkpoint_path = %checkpoint_location,
            checkpoint = %checkpoint,
            object_store = backends.has_object_store(),
            "Opened scan session"
        );

        Ok(Session {
            data,
            checkpoint_location,
            backends,
            clock: self.clock,
            commit_mode: self.config.commit_mode,
            checkpoint,
            committed: None,
            max_seen: None,
            state: SessionState::Initialized,
        })
    }
}
