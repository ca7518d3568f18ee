//! Process-local storage backend.
//!
//! Holds every table in memory behind a single lock. Used by tests and by
//! callers embedding the selectors without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LogicStore, MediaCatalog, TempStore, TrialStore};
use crate::domain::{CacheKey, CatalogOrdering, Logic, MediaRecord, Trial};
use crate::error::LogicError;

#[derive(Debug, Default)]
struct Tables {
    media: HashMap<i64, MediaRecord>,
    contents: HashMap<i64, Vec<u8>>,
    logics: HashMap<i64, Logic>,
    trials: HashMap<Uuid, Trial>,
    temps: HashMap<CacheKey, String>,
    next_media_id: i64,
}

/// In-memory implementation of every storage trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a media record with the next free id.
    ///
    /// The content URL is `/media/<content>`.
    pub async fn add_media(
        &self,
        ext: &str,
        tag: &str,
        content: &str,
        bytes: Vec<u8>,
    ) -> MediaRecord {
        let mut tables = self.tables.write().await;
        tables.next_media_id += 1;
        let id = tables.next_media_id;

        let record = MediaRecord::new(id, ext, tag, content, format!("/media/{}", content));
        tables.media.insert(id, record.clone());
        tables.contents.insert(id, bytes);
        record
    }

    /// Insert a fully specified record, keeping its id
    pub async fn insert_media(&self, record: MediaRecord, bytes: Vec<u8>) {
        let mut tables = self.tables.write().await;
        tables.next_media_id = tables.next_media_id.max(record.id);
        tables.contents.insert(record.id, bytes);
        tables.media.insert(record.id, record);
    }

    /// Drop a media record and its content
    pub async fn remove_media(&self, id: i64) -> Option<MediaRecord> {
        let mut tables = self.tables.write().await;
        tables.contents.remove(&id);
        tables.media.remove(&id)
    }
}

#[async_trait]
impl MediaCatalog for MemoryStore {
    async fn list_media(&self, ordering: CatalogOrdering) -> Result<Vec<MediaRecord>, LogicError> {
        let tables = self.tables.read().await;
        let mut records: Vec<_> = tables.media.values().cloned().collect();
        ordering.sort(&mut records);
        Ok(records)
    }

    async fn get_media(&self, id: i64) -> Result<Option<MediaRecord>, LogicError> {
        Ok(self.tables.read().await.media.get(&id).cloned())
    }

    async fn read_content(&self, record: &MediaRecord) -> Result<Vec<u8>, LogicError> {
        self.tables
            .read()
            .await
            .contents
            .get(&record.id)
            .cloned()
            .ok_or(LogicError::MediaNotFound(record.id))
    }
}

#[async_trait]
impl LogicStore for MemoryStore {
    async fn get_logic(&self, id: i64) -> Result<Option<Logic>, LogicError> {
        Ok(self.tables.read().await.logics.get(&id).cloned())
    }

    async fn save_logic(&self, logic: &Logic) -> Result<(), LogicError> {
        self.tables
            .write()
            .await
            .logics
            .insert(logic.id, logic.clone());
        Ok(())
    }

    async fn delete_logic(&self, id: i64) -> Result<bool, LogicError> {
        Ok(self.tables.write().await.logics.remove(&id).is_some())
    }
}

#[async_trait]
impl TrialStore for MemoryStore {
    async fn get_trial(&self, id: Uuid) -> Result<Option<Trial>, LogicError> {
        Ok(self.tables.read().await.trials.get(&id).cloned())
    }

    async fn save_trial(&self, trial: &Trial) -> Result<(), LogicError> {
        self.tables
            .write()
            .await
            .trials
            .insert(trial.id, trial.clone());
        Ok(())
    }
}

#[async_trait]
impl TempStore for MemoryStore {
    async fn get_temp(&self, key: &CacheKey) -> Result<Option<String>, LogicError> {
        Ok(self.tables.read().await.temps.get(key).cloned())
    }

    async fn put_temp(&self, key: &CacheKey, content: &str) -> Result<(), LogicError> {
        self.tables
            .write()
            .await
            .temps
            .insert(key.clone(), content.to_string());
        Ok(())
    }

    async fn delete_temp(&self, key: &CacheKey) -> Result<bool, LogicError> {
        Ok(self.tables.write().await.temps.remove(key).is_some())
    }
}
