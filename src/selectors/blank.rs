//! Selector that shows nothing.

use async_trait::async_trait;

use super::{SelectionSettings, Selector};
use crate::core::state_log::StateLog;
use crate::domain::{ContentPayload, Logic};
use crate::error::LogicError;
use crate::store::Storage;

#[derive(Debug, Clone, Default)]
pub struct BlankSelector {
    state: StateLog,
}

impl BlankSelector {
    pub fn new(settings: SelectionSettings) -> Self {
        Self {
            state: StateLog::new(settings.state_retention),
        }
    }
}

#[async_trait]
impl Selector for BlankSelector {
    async fn prep(&self, store: &dyn Storage, logic: &mut Logic) -> Result<(), LogicError> {
        self.state.append(store, logic, "blank_prep started.").await?;
        self.state.append(store, logic, "blank_prep finished.").await
    }

    async fn get_content(
        &self,
        _store: &dyn Storage,
        _logic: &Logic,
        _seq: i64,
    ) -> Result<ContentPayload, LogicError> {
        Ok(ContentPayload::blank())
    }
}
