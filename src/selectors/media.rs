//! Selector for media files filtered by extension and tag.
//!
//! Text media (`txt`) is never selected here; the text selector owns it.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{arrange, parse_entry, sequence_index, SelectionSettings, Selector};
use crate::core::state_log::StateLog;
use crate::domain::{ContentPayload, FilterList, Logic, MediaRecord};
use crate::error::LogicError;
use crate::store::Storage;

#[derive(Debug, Clone)]
pub struct MediaSelector {
    settings: SelectionSettings,
    state: StateLog,
}

impl MediaSelector {
    pub fn new(settings: SelectionSettings) -> Self {
        Self {
            settings,
            state: StateLog::new(settings.state_retention),
        }
    }
}

/// Whether a catalog record passes the extension and tag filters
pub fn accepts(record: &MediaRecord, ext_filter: &FilterList, tag_filter: &FilterList) -> bool {
    if record.is_text() || !ext_filter.accepts(&record.ext) {
        return false;
    }
    tag_filter.is_wildcard() || tag_filter.intersects(record.tags())
}

#[async_trait]
impl Selector for MediaSelector {
    async fn prep(&self, store: &dyn Storage, logic: &mut Logic) -> Result<(), LogicError> {
        self.state.append(store, logic, "media_prep started.").await?;

        let ext_filter = FilterList::parse(&logic.media_ext);
        logic.media_ext = ext_filter.canonical();
        let tag_filter = FilterList::parse(&logic.media_tag);
        logic.media_tag = tag_filter.canonical();

        let mut selected: Vec<i64> = Vec::new();
        for record in store.list_media(self.settings.catalog_ordering).await? {
            if !accepts(&record, &ext_filter, &tag_filter) {
                continue;
            }
            if selected.len() >= self.settings.max_media_count {
                break;
            }
            debug!(logic_id = logic.id, media_id = record.id, ext = %record.ext, "Selected media");
            selected.push(record.id);
        }

        arrange(logic.media_order, &mut selected);
        logic.set_selection(&selected);

        self.state.append(store, logic, "media_prep finished.").await
    }

    async fn get_content(
        &self,
        store: &dyn Storage,
        logic: &Logic,
        seq: i64,
    ) -> Result<ContentPayload, LogicError> {
        let selection = logic.selection();
        if selection.is_empty() {
            return Ok(ContentPayload::no_data());
        }

        let media_id: i64 = parse_entry(selection[sequence_index(seq, selection.len())])?;
        match store.get_media(media_id).await? {
            Some(record) => Ok(ContentPayload::media(record.ext, record.content_url)),
            None => {
                warn!(logic_id = logic.id, media_id, "Selected media no longer exists");
                Err(LogicError::MediaNotFound(media_id))
            }
        }
    }
}
