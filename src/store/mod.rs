//! Storage capabilities the selectors depend on.
//!
//! Each concern of the surrounding system is its own trait:
//! - `MediaCatalog`: read-only media records and their bytes
//! - `LogicStore`: read/write Logic records
//! - `TrialStore`: Trial lookup
//! - `TempStore`: keyed side cache with a single text payload
//!
//! `Storage` bundles all four so the dispatcher can take one handle.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CacheKey, CatalogOrdering, Logic, MediaRecord, Trial};
use crate::error::LogicError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Read access to the media catalog
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// All records, in the requested order
    async fn list_media(&self, ordering: CatalogOrdering) -> Result<Vec<MediaRecord>, LogicError>;

    /// A single record by id
    async fn get_media(&self, id: i64) -> Result<Option<MediaRecord>, LogicError>;

    /// Read the full content of a record.
    ///
    /// The underlying handle is released before this returns, whether or
    /// not the read succeeded.
    async fn read_content(&self, record: &MediaRecord) -> Result<Vec<u8>, LogicError>;
}

/// Read/write access to Logic records
#[async_trait]
pub trait LogicStore: Send + Sync {
    async fn get_logic(&self, id: i64) -> Result<Option<Logic>, LogicError>;

    /// Insert or overwrite a Logic by id
    async fn save_logic(&self, logic: &Logic) -> Result<(), LogicError>;

    /// Remove a Logic; returns whether it existed
    async fn delete_logic(&self, id: i64) -> Result<bool, LogicError>;
}

/// Trial lookup
#[async_trait]
pub trait TrialStore: Send + Sync {
    async fn get_trial(&self, id: Uuid) -> Result<Option<Trial>, LogicError>;

    async fn save_trial(&self, trial: &Trial) -> Result<(), LogicError>;
}

/// Keyed side cache holding one text payload per key
#[async_trait]
pub trait TempStore: Send + Sync {
    async fn get_temp(&self, key: &CacheKey) -> Result<Option<String>, LogicError>;

    /// Create the entry or overwrite its content
    async fn put_temp(&self, key: &CacheKey, content: &str) -> Result<(), LogicError>;

    /// Remove the entry; returns whether it existed
    async fn delete_temp(&self, key: &CacheKey) -> Result<bool, LogicError>;
}

/// Everything the dispatcher needs from the surrounding system
pub trait Storage: MediaCatalog + LogicStore + TrialStore + TempStore {}

impl<T> Storage for T where T: MediaCatalog + LogicStore + TrialStore + TempStore {}
