//! Routes a Logic to its selector for preparation and content fetches.

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CacheKey, ContentPayload, Logic, Trial};
use crate::error::LogicError;
use crate::selectors::{SelectionSettings, Selector, SelectorKind};
use crate::store::Storage;

/// Entry point for preparing Logics and serving Trial content
pub struct Dispatcher<S> {
    store: S,
    settings: SelectionSettings,
}

impl<S: Storage> Dispatcher<S> {
    pub fn new(store: S, settings: SelectionSettings) -> Self {
        Self { store, settings }
    }

    /// The underlying storage
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    /// Reset and re-prepare a Logic.
    ///
    /// The cleared Logic is persisted before the selector runs, and again
    /// once it finishes. An unknown `implement` fails after the reset.
    pub async fn prepare(&self, logic: &mut Logic) -> Result<(), LogicError> {
        logic.reset();
        self.store.save_logic(logic).await?;

        let implementation = logic.implementation()?;
        info!(logic_id = logic.id, implementation = %implementation, "Preparing logic");

        SelectorKind::new(implementation, self.settings)
            .prep(&self.store, logic)
            .await?;
        self.store.save_logic(logic).await?;

        info!(logic_id = logic.id, media_count = logic.media_count, "Logic prepared");
        Ok(())
    }

    /// Load a Logic by id and prepare it
    pub async fn prepare_by_id(&self, logic_id: i64) -> Result<Logic, LogicError> {
        let mut logic = self.load_logic(logic_id).await?;
        self.prepare(&mut logic).await?;
        Ok(logic)
    }

    /// Content for sequence number `seq` of a Trial's Logic
    pub async fn fetch_content(&self, trial: &Trial, seq: i64) -> Result<ContentPayload, LogicError> {
        let logic = self.load_logic(trial.logic_id).await?;
        let implementation = logic.implementation()?;

        SelectorKind::new(implementation, self.settings)
            .get_content(&self.store, &logic, seq)
            .await
    }

    /// Resolve a Trial by id and fetch its content
    pub async fn fetch_content_by_trial_id(
        &self,
        trial_id: Uuid,
        seq: i64,
    ) -> Result<ContentPayload, LogicError> {
        let trial = self
            .store
            .get_trial(trial_id)
            .await?
            .ok_or(LogicError::TrialNotFound(trial_id))?;
        self.fetch_content(&trial, seq).await
    }

    /// Delete a Logic along with its text cache entry
    pub async fn delete_logic(&self, logic_id: i64) -> Result<bool, LogicError> {
        let existed = self.store.delete_logic(logic_id).await?;
        self.store
            .delete_temp(&CacheKey::text_logic(logic_id))
            .await?;
        Ok(existed)
    }

    async fn load_logic(&self, logic_id: i64) -> Result<Logic, LogicError> {
        match self.store.get_logic(logic_id).await? {
            Some(logic) => Ok(logic),
            None => {
                warn!(logic_id, "Logic not found");
                Err(LogicError::LogicNotFound(logic_id))
            }
        }
    }
}
