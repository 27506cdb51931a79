//! Object store backend (S3 and S3-compatible services)
//!
//! The `object_store` client is async; this backend owns a current-thread
//! Tokio runtime and blocks on each call so the public API stays synchronous.
//! It must therefore not be used from inside another Tokio runtime.

use crate::Backend;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectMeta, ObjectStore, PutPayload, RetryConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tidemark_core::{
    Checkpoint, ConfigError, Error, FileRecord, FileRef, Location, ObjectAddress, Result,
    StoreConfig,
};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Object store backend
///
/// Holds one client per bucket, built on first use from the optional
/// [`StoreConfig`] (or the `AWS_*` environment when none is given).
pub struct ObjectStoreBackend {
    runtime: Runtime,
    config: Option<StoreConfig>,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    pub fn new(config: Option<StoreConfig>) -> Result<Self> {
        if let Some(config) = &config {
            config.validate()?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        Ok(Self {
            runtime,
            config,
            stores: Mutex::new(HashMap::new()),
        })
    }

    /// Serve `bucket` from an existing store instead of building an S3 client
    pub fn with_store(self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.lock().insert(bucket.into(), store);
        self
    }

    /// Client for `bucket`, building it if needed
    pub fn connect(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let mut stores = self.stores.lock();
        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store: Arc<dyn ObjectStore> = Arc::new(build_s3_client(bucket, self.config.as_ref())?);
        debug!(bucket, "Built object store client");
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

impl Backend for ObjectStoreBackend {
    fn name(&self) -> &'static str {
        "object_store"
    }

    fn load_checkpoint(&self, location: &Location) -> Result<Checkpoint> {
        let addr = checkpoint_address(location)?;
        let path = object_path(location, &addr.key)?;
        let store = self.connect(&addr.bucket)?;

        let fetched = self
            .runtime
            .block_on(async { store.get(&path).await?.bytes().await });

        match fetched {
            Ok(body) => Checkpoint::decode(&body, location.raw()),
            Err(object_store::Error::NotFound { .. }) => {
                debug!(uri = %addr.uri(), "No checkpoint object, starting from scratch");
                Ok(Checkpoint::NONE)
            }
            Err(e) => Err(Error::backend("get", e)),
        }
    }

    fn commit_checkpoint(&self, location: &Location, checkpoint: &Checkpoint) -> Result<()> {
        let addr = checkpoint_address(location)?;
        let path = object_path(location, &addr.key)?;
        let store = self.connect(&addr.bucket)?;
        let payload = PutPayload::from(Bytes::from(checkpoint.encode()));

        self.runtime
            .block_on(store.put(&path, payload))
            .map_err(|e| Error::backend("put", e))?;

        info!(uri = %addr.uri(), "Wrote checkpoint object");
        Ok(())
    }

    fn list_new_files(&self, location: &Location, since: f64) -> Result<Vec<FileRecord>> {
        let addr = object_address(location)?;
        let listing_root = listing_root(location, &addr.key)?;
        let store = self.connect(&addr.bucket)?;

        let objects: Vec<ObjectMeta> = self
            .runtime
            .block_on(store.list(listing_root.as_ref()).try_collect::<Vec<_>>())
            .map_err(|e| Error::backend("list", e))?;

        let listed = objects.len();
        let files = select_new(&addr.bucket, &addr.key, objects, since);
        debug!(
            uri = %addr.uri(),
            since,
            listed,
            found = files.len(),
            "Object store enumeration complete"
        );
        Ok(files)
    }
}

/// Keep objects under `prefix` whose last-modified time is strictly after `since`
///
/// `prefix` is a plain string prefix, as in S3 `ListObjectsV2`, matched
/// against the unencoded key.
pub fn select_new(
    bucket: &str,
    prefix: &str,
    objects: impl IntoIterator<Item = ObjectMeta>,
    since: f64,
) -> Vec<FileRecord> {
    objects
        .into_iter()
        .filter(|meta| meta.location.as_ref().starts_with(prefix))
        .filter_map(|meta| {
            let modified = datetime_seconds(&meta.last_modified);
            (modified > since).then(|| {
                FileRecord::new(
                    FileRef::Object {
                        bucket: bucket.to_string(),
                        key: meta.location.as_ref().to_string(),
                    },
                    modified,
                )
            })
        })
        .collect()
}

/// Directory to list for a string prefix
///
/// `object_store` lists by path segment, so "in/da" lists "in" and the
/// caller filters on the full prefix.
fn listing_root(location: &Location, prefix: &str) -> Result<Option<ObjectPath>> {
    match prefix.rfind('/') {
        Some(0) | None => Ok(None),
        Some(idx) => object_path(location, &prefix[..idx]).map(Some),
    }
}

/// Object path for a key as written by the user
///
/// `ObjectPath::from` would percent-encode characters such as `[`, `~` or
/// `#` and address a different object.
fn object_path(location: &Location, key: &str) -> Result<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| {
        ConfigError::InvalidLocation {
            path: location.raw().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn datetime_seconds(time: &DateTime<Utc>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}

fn object_address(location: &Location) -> Result<&ObjectAddress> {
    location.object_address().ok_or_else(|| {
        ConfigError::InvalidLocation {
            path: location.raw().to_string(),
            reason: "not an object store address".to_string(),
        }
        .into()
    })
}

fn checkpoint_address(location: &Location) -> Result<&ObjectAddress> {
    let addr = object_address(location)?;
    if addr.key.is_empty() || addr.key.ends_with('/') {
        return Err(ConfigError::InvalidLocation {
            path: location.raw().to_string(),
            reason: "checkpoint needs an object key, not a bucket or prefix".to_string(),
        }
        .into());
    }
    Ok(addr)
}

fn build_s3_client(
    bucket: &str,
    config: Option<&StoreConfig>,
) -> Result<object_store::aws::AmazonS3> {
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

    if let Some(config) = config {
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.with_endpoint(endpoint);
        }
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder
                .with_access_key_id(access_key)
                .with_secret_access_key(secret_key);
        }
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if config.allow_http.is_some() || config.endpoint_url.is_some() {
            builder = builder.with_allow_http(config.allows_http());
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.with_client_options(ClientOptions::new().with_timeout(timeout));
        }
        if let Some(max_retries) = config.max_retries {
            builder = builder.with_retry(RetryConfig {
                max_retries,
                ..Default::default()
            });
        }
    }

    builder.build().map_err(|e| Error::backend("connect", e))
}
