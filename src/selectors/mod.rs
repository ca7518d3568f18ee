//! Content selectors.
//!
//! Each selector has two phases:
//! - `prep`: scan the catalog and store a selection on the Logic
//! - `get_content`: serve one item of that selection by sequence number
//!
//! `SelectorKind` is the closed set of variants a Logic can name.

pub mod blank;
pub mod media;
pub mod text;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::core::state_log::StateRetention;
use crate::domain::{CatalogOrdering, ContentPayload, Implementation, Logic, MediaOrder};
use crate::error::LogicError;
use crate::store::Storage;

pub use blank::BlankSelector;
pub use media::MediaSelector;
pub use text::TextSelector;

/// Upper bound on the length of any prepared selection
pub const DEFAULT_MAX_MEDIA_COUNT: usize = 1000;

/// Tunables shared by all selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Maximum number of entries a prepared selection may hold
    pub max_media_count: usize,

    /// Scan order for the media selector
    pub catalog_ordering: CatalogOrdering,

    /// What to keep of the state log as it grows
    pub state_retention: StateRetention,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_media_count: DEFAULT_MAX_MEDIA_COUNT,
            catalog_ordering: CatalogOrdering::IdDescending,
            state_retention: StateRetention::Unbounded,
        }
    }
}

/// The two phases every selector implements
#[async_trait]
pub trait Selector: Send + Sync {
    /// Fill `media_list`/`media_count` (and any side data) for the Logic
    async fn prep(&self, store: &dyn Storage, logic: &mut Logic) -> Result<(), LogicError>;

    /// Content for sequence number `seq` of a prepared Logic
    async fn get_content(
        &self,
        store: &dyn Storage,
        logic: &Logic,
        seq: i64,
    ) -> Result<ContentPayload, LogicError>;
}

/// One selector per `Implementation` variant
#[derive(Debug, Clone)]
pub enum SelectorKind {
    Media(MediaSelector),
    Text(TextSelector),
    Blank(BlankSelector),
}

impl SelectorKind {
    pub fn new(implementation: Implementation, settings: SelectionSettings) -> Self {
        match implementation {
            Implementation::Media => SelectorKind::Media(MediaSelector::new(settings)),
            Implementation::Text => SelectorKind::Text(TextSelector::new(settings)),
            Implementation::Blank => SelectorKind::Blank(BlankSelector::new(settings)),
        }
    }

    fn inner(&self) -> &dyn Selector {
        match self {
            SelectorKind::Media(s) => s,
            SelectorKind::Text(s) => s,
            SelectorKind::Blank(s) => s,
        }
    }
}

#[async_trait]
impl Selector for SelectorKind {
    async fn prep(&self, store: &dyn Storage, logic: &mut Logic) -> Result<(), LogicError> {
        self.inner().prep(store, logic).await
    }

    async fn get_content(
        &self,
        store: &dyn Storage,
        logic: &Logic,
        seq: i64,
    ) -> Result<ContentPayload, LogicError> {
        self.inner().get_content(store, logic, seq).await
    }
}

/// Position in a selection of `count` entries for sequence number `seq`.
///
/// Uses Euclidean remainder: `seq = count` maps to 0 and `seq = -1` maps to
/// the last entry. `count` must be non-zero.
pub fn sequence_index(seq: i64, count: usize) -> usize {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    // rem_euclid with a positive divisor is always in 0..count
    usize::try_from(seq.rem_euclid(count)).unwrap_or_default()
}

/// Apply the serving order to a selection
pub(crate) fn arrange<T>(order: MediaOrder, entries: &mut [T]) {
    if order == MediaOrder::Shuffle {
        entries.shuffle(&mut rand::thread_rng());
    }
}

/// Parse one entry of a prepared selection
pub(crate) fn parse_entry<T: std::str::FromStr>(entry: &str) -> Result<T, LogicError> {
    entry
        .parse()
        .map_err(|_| LogicError::InvalidSelection(entry.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_index_wraps() {
        assert_eq!(sequence_index(0, 3), 0);
        assert_eq!(sequence_index(3, 3), 0);
        assert_eq!(sequence_index(7, 3), 1);
        assert_eq!(sequence_index(i64::MAX, 1), 0);
    }

    #[test]
    fn test_sequence_index_negative() {
        assert_eq!(sequence_index(-1, 3), 2);
        assert_eq!(sequence_index(-3, 3), 0);
        assert_eq!(sequence_index(-4, 3), 2);
        assert_eq!(sequence_index(i64::MIN, 5), 2);
    }

    #[test]
    fn test_arrange_sequential_keeps_order() {
        let mut entries = vec![1, 2, 3, 4];
        arrange(MediaOrder::Sequential, &mut entries);
        assert_eq!(entries, vec![1, 2, 3, 4]);

        arrange(MediaOrder::Shuffle, &mut entries);
        entries.sort_unstable();
        assert_eq!(entries, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(parse_entry::<i64>("42").unwrap(), 42);
        assert!(matches!(
            parse_entry::<usize>("x1"),
            Err(LogicError::InvalidSelection(ref s)) if s == "x1"
        ));
    }
}
