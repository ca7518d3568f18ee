//! Media catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extension reserved for line-oriented text media
pub const TEXT_EXT: &str = "txt";

/// A single entry in the media catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Catalog primary key
    pub id: i64,

    /// File extension without the dot ("jpg", "png", "txt", ...)
    pub ext: String,

    /// Space-separated tag tokens
    #[serde(default)]
    pub tag: String,

    /// Storage name of the content (relative to the media root)
    pub content: String,

    /// Public locator handed to clients
    pub content_url: String,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Create a record with the current timestamp
    pub fn new(
        id: i64,
        ext: impl Into<String>,
        tag: impl Into<String>,
        content: impl Into<String>,
        content_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ext: ext.into(),
            tag: tag.into(),
            content: content.into(),
            content_url: content_url.into(),
            updated_at: Utc::now(),
        }
    }

    /// Iterate over the record's tag tokens
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tag.split_whitespace()
    }

    /// Whether this record holds line-oriented text
    pub fn is_text(&self) -> bool {
        self.ext == TEXT_EXT
    }
}

/// Ordering used when scanning the catalog for media selection.
///
/// The storage backend historically could not order by modification time,
/// so "newest first" is approximated by descending id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrdering {
    /// Insertion order (ascending id)
    Natural,

    /// Descending id, the newest-first approximation
    #[default]
    IdDescending,

    /// Descending modification time, ties broken by descending id
    UpdatedDescending,
}

impl CatalogOrdering {
    /// Sort records in place according to this policy
    pub fn sort(self, records: &mut [MediaRecord]) {
        match self {
            CatalogOrdering::Natural => records.sort_by_key(|r| r.id),
            CatalogOrdering::IdDescending => records.sort_by(|a, b| b.id.cmp(&a.id)),
            CatalogOrdering::UpdatedDescending => records.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
        }
    }
}

impl std::fmt::Display for CatalogOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogOrdering::Natural => write!(f, "natural"),
            CatalogOrdering::IdDescending => write!(f, "id_descending"),
            CatalogOrdering::UpdatedDescending => write!(f, "updated_descending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: i64) -> MediaRecord {
        MediaRecord::new(id, "jpg", "", format!("{}.jpg", id), format!("/media/{}.jpg", id))
    }

    #[test]
    fn test_tags_split_on_whitespace() {
        let r = MediaRecord::new(1, "jpg", " cat  dog\tbird ", "a.jpg", "/media/a.jpg");
        assert_eq!(r.tags().collect::<Vec<_>>(), vec!["cat", "dog", "bird"]);
        assert!(!r.is_text());
    }

    #[test]
    fn test_ordering_policies() {
        let now = Utc::now();
        let mut records = vec![record(2), record(3), record(1)];
        records[0].updated_at = now;
        records[1].updated_at = now - Duration::hours(1);
        records[2].updated_at = now + Duration::hours(1);

        CatalogOrdering::IdDescending.sort(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        CatalogOrdering::Natural.sort(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        CatalogOrdering::UpdatedDescending.sort(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
