//! Storage backends for Tidemark
//!
//! Each backend knows how to load and commit a checkpoint record and how to
//! enumerate files newer than a cutoff:
//! - [`LocalBackend`]: checkpoint file on disk, recursive directory walk
//! - [`ObjectStoreBackend`]: checkpoint object, prefix listing (S3/MinIO)
//!
//! [`Backends`] picks the right one for a [`Location`] by its tag.

pub mod local;
pub mod remote;

pub use local::LocalBackend;
pub use remote::{select_new, ObjectStoreBackend};

use tidemark_core::{Checkpoint, ConfigError, FileRecord, Location, Result, StoreConfig, Target};

/// Operations every storage backend provides
pub trait Backend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Read the checkpoint record; a missing record is [`Checkpoint::NONE`]
    fn load_checkpoint(&self, location: &Location) -> Result<Checkpoint>;

    /// Overwrite the checkpoint record
    fn commit_checkpoint(&self, location: &Location, checkpoint: &Checkpoint) -> Result<()>;

    /// Files under `location` modified strictly after `since`
    fn list_new_files(&self, location: &Location, since: f64) -> Result<Vec<FileRecord>>;
}

/// The backends available to one session
pub struct Backends {
    local: LocalBackend,
    object: Option<ObjectStoreBackend>,
}

impl Backends {
    /// Local filesystem only; object store locations will fail to resolve
    pub fn local_only() -> Self {
        Self {
            local: LocalBackend::new(),
            object: None,
        }
    }

    /// Build what the given locations need
    ///
    /// The object store client is only constructed when at least one location
    /// is an object store address, so local-only setups never need
    /// credentials.
    pub fn for_locations(locations: &[&Location], store: Option<&StoreConfig>) -> Result<Self> {
        let mut backends = Self::local_only();

        if locations.iter().any(|loc| loc.is_object_store()) {
            let object = ObjectStoreBackend::new(store.cloned())?;
            for addr in locations.iter().filter_map(|loc| loc.object_address()) {
                object.connect(&addr.bucket)?;
            }
            backends.object = Some(object);
        }

        Ok(backends)
    }

    /// Use a preconfigured object store backend
    pub fn with_object_store(mut self, object: ObjectStoreBackend) -> Self {
        self.object = Some(object);
        self
    }

    pub fn has_object_store(&self) -> bool {
        self.object.is_some()
    }

    /// Backend responsible for `location`
    pub fn resolve(&self, location: &Location) -> Result<&dyn Backend> {
        location.ensure_supported()?;

        if let Target::Local(_) = location.target() {
            return Ok(&self.local);
        }

        match &self.object {
            Some(object) => Ok(object),
            None => Err(ConfigError::BackendUnavailable {
                path: location.raw().to_string(),
            }
            .into()),
        }
    }
}
