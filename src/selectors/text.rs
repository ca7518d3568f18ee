//! Selector serving single lines drawn from tagged text media.
//!
//! `prep` flattens the lines of every matching `txt` record into one list,
//! stores that list in the side cache under the Logic's key, and keeps an
//! index permutation into it as the Logic's selection.
//!
//! The cached list is joined with single spaces and split on whitespace
//! when served, so a line containing spaces occupies several tokens.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{arrange, parse_entry, sequence_index, SelectionSettings, Selector};
use crate::core::state_log::StateLog;
use crate::domain::{CacheKey, CatalogOrdering, ContentPayload, FilterList, Logic};
use crate::error::LogicError;
use crate::store::Storage;

#[derive(Debug, Clone)]
pub struct TextSelector {
    settings: SelectionSettings,
    state: StateLog,
}

impl TextSelector {
    pub fn new(settings: SelectionSettings) -> Self {
        Self {
            settings,
            state: StateLog::new(settings.state_retention),
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split text into lines on any line boundary, `\r\n` counting once.
/// A trailing boundary does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(pos) = rest.find(is_line_break) else {
            lines.push(rest);
            break;
        };
        lines.push(&rest[..pos]);

        let tail = &rest[pos..];
        let skip = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map(char::len_utf8).unwrap_or(1)
        };
        rest = &tail[skip..];
    }

    lines
}

#[async_trait]
impl Selector for TextSelector {
    async fn prep(&self, store: &dyn Storage, logic: &mut Logic) -> Result<(), LogicError> {
        self.state.append(store, logic, "text_prep started.").await?;

        let tag_filter = FilterList::parse(&logic.media_tag);
        logic.media_tag = tag_filter.canonical();

        let mut lines: Vec<String> = Vec::new();
        for record in store.list_media(CatalogOrdering::Natural).await? {
            if !record.is_text() || !tag_filter.intersects(record.tags()) {
                continue;
            }

            let bytes = store.read_content(&record).await?;
            let text = String::from_utf8(bytes).map_err(|source| LogicError::Decode {
                media_id: record.id,
                source,
            })?;
            let before = lines.len();
            lines.extend(split_lines(&text).into_iter().map(str::to_string));
            debug!(
                logic_id = logic.id,
                media_id = record.id,
                lines = lines.len() - before,
                "Loaded text media"
            );
        }

        let mut indices: Vec<usize> = (0..lines.len()).collect();
        arrange(logic.media_order, &mut indices);
        indices.truncate(self.settings.max_media_count);
        logic.set_selection(&indices);

        store
            .put_temp(&CacheKey::text_logic(logic.id), &lines.join(" "))
            .await?;

        self.state.append(store, logic, "text_prep finished.").await
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

        let index: usize = parse_entry(selection[sequence_index(seq, selection.len())])?;

        let key = CacheKey::text_logic(logic.id);
        let Some(content) = store.get_temp(&key).await? else {
            warn!(logic_id = logic.id, "Text cache missing; was the logic prepared?");
            return Err(LogicError::CacheNotFound(key));
        };

        match content.split_whitespace().nth(index) {
            Some(line) => Ok(ContentPayload::text(line)),
            None => Err(LogicError::TextIndexOutOfRange { key, index }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, TempStore};

    async fn prepared(store: &MemoryStore, text: &str) -> (TextSelector, Logic) {
        store.add_media("txt", "t", "t.txt", text.as_bytes().to_vec()).await;
        let selector = TextSelector::new(SelectionSettings::default());
        let mut logic = Logic::new(1, "text").with_tag("t");
        selector.prep(store, &mut logic).await.unwrap();
        (selector, logic)
    }

    #[test]
    fn test_split_lines_boundaries() {
        assert_eq!(split_lines("a\nb\r\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\rb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("x\u{2028}y"), vec!["x", "y"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_split_lines_keeps_inner_spaces() {
        assert_eq!(split_lines("hello world\nbye"), vec!["hello world", "bye"]);
    }

    #[tokio::test]
    async fn test_spaced_line_is_served_as_tokens() {
        let store = MemoryStore::new();
        let (selector, logic) = prepared(&store, "hello world\nbye").await;

        assert_eq!(logic.media_list, "0 1");
        assert_eq!(
            store.get_temp(&CacheKey::text_logic(1)).await.unwrap().as_deref(),
            Some("hello world bye")
        );

        let first = selector.get_content(&store, &logic, 0).await.unwrap();
        let second = selector.get_content(&store, &logic, 1).await.unwrap();
        assert_eq!(first, ContentPayload::text("hello"));
        assert_eq!(second, ContentPayload::text("world"));
    }

    #[tokio::test]
    async fn test_empty_line_shifts_index_past_tokens() {
        let store = MemoryStore::new();
        let (selector, logic) = prepared(&store, "a\n\nb").await;
        assert_eq!(logic.media_count, 3);

        // "a  b" splits into two tokens; index 1 lands on "b"
        let payload = selector.get_content(&store, &logic, 1).await.unwrap();
        assert_eq!(payload, ContentPayload::text("b"));

        let err = selector.get_content(&store, &logic, 2).await.unwrap_err();
        assert!(matches!(
            err,
            LogicError::TextIndexOutOfRange { ref key, index: 2 } if *key == CacheKey::text_logic(1)
        ));
        assert!(err.is_not_found());
    }
}
