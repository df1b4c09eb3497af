//! # Storage Module
//!
//! The object store is the system of record for batch contents. This module
//! defines the `ObjectStore` seam, the key layout under which batches live,
//! and the bookkeeping repository that derives "current batch" and
//! "unprocessed batches" from what has been written.

pub mod batch_repository;
pub mod clock;
pub mod errors;
pub mod locations;
pub mod memory;

pub use batch_repository::{read_submitter_context, BatchRepository, ObjectStoreBatchRepository};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{StorageError, StorageResult};
pub use memory::InMemoryObjectStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Metadata for one stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Key/value object storage with S3-like prefix listing.
///
/// Folders are implicit: a folder exists while at least one key lives under it.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    async fn put(&self, key: &str, body: Vec<u8>) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Delete every key in `keys`; missing keys are ignored
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()>;

    /// All objects whose key starts with `prefix`, sorted by key
    async fn list_by_prefix(&self, prefix: &str) -> StorageResult<Vec<StoredObject>>;

    /// Immediate sub-folders of `prefix`, each returned as a full prefix ending in `/`
    async fn list_subfolders(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
