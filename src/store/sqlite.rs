//! SQLite storage backend.
//!
//! Records live in a single database file; media bytes live as plain files
//! under a media root, referenced by their storage name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{LogicStore, MediaCatalog, TempStore, TrialStore};
use crate::domain::{CacheKey, CatalogOrdering, Logic, MediaOrder, MediaRecord, Trial};
use crate::error::LogicError;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS media (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  ext TEXT NOT NULL,
  tag TEXT NOT NULL DEFAULT '',
  content TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS logic (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  implement TEXT NOT NULL,
  media_ext TEXT NOT NULL DEFAULT '*',
  media_tag TEXT NOT NULL DEFAULT '*',
  media_order TEXT NOT NULL DEFAULT 'sequential',
  media_list TEXT NOT NULL DEFAULT '',
  media_count INTEGER NOT NULL DEFAULT 0,
  state TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS trial (
  id TEXT PRIMARY KEY,
  logic_id INTEGER NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS temp (
  name TEXT PRIMARY KEY,
  content TEXT NOT NULL DEFAULT ''
);
";

const MEDIA_COLUMNS: &str = "id, ext, tag, content, updated_at";
const LOGIC_COLUMNS: &str =
    "id, implement, media_ext, media_tag, media_order, media_list, media_count, state";

/// SQLite-backed implementation of every storage trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
    media_root: PathBuf,
    media_url: String,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(
        path: &Path,
        media_root: impl Into<PathBuf>,
        media_url: impl Into<String>,
    ) -> Result<Self, LogicError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?, media_root.into(), media_url.into())
    }

    /// Open a private in-memory database
    pub fn open_in_memory(
        media_root: impl Into<PathBuf>,
        media_url: impl Into<String>,
    ) -> Result<Self, LogicError> {
        Self::with_connection(
            Connection::open_in_memory()?,
            media_root.into(),
            media_url.into(),
        )
    }

    fn with_connection(
        conn: Connection,
        media_root: PathBuf,
        media_url: String,
    ) -> Result<Self, LogicError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            media_root,
            media_url,
        })
    }

    /// Directory holding media bytes
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Copy a file under the media root and catalog it.
    ///
    /// The extension is taken from the file name, lowercased. The stored
    /// name is `<id>/<file name>` so equal file names never collide.
    pub async fn add_media(&self, source: &Path, tag: &str) -> Result<MediaRecord, LogicError> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file name: {}", source.display()),
                )
            })?
            .to_string();
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let tag = tag.split_whitespace().collect::<Vec<_>>().join(" ");
        let updated_at = Utc::now();

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO media (ext, tag, content, updated_at) VALUES (?1, ?2, '', ?3)",
            params![ext, tag, updated_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        let content = format!("{}/{}", id, file_name);

        // The row must not outlive a failed copy
        if let Err(e) = copy_file(source, &self.media_root.join(&content)).await {
            conn.execute("DELETE FROM media WHERE id = ?1", params![id])?;
            return Err(e.into());
        }
        conn.execute(
            "UPDATE media SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;

        Ok(MediaRecord {
            id,
            content_url: self.content_url(&content),
            ext,
            tag,
            content,
            updated_at,
        })
    }

    /// Insert a new Logic, assigning its id
    pub async fn create_logic(
        &self,
        implement: &str,
        media_ext: &str,
        media_tag: &str,
        media_order: MediaOrder,
    ) -> Result<Logic, LogicError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO logic (implement, media_ext, media_tag, media_order) VALUES (?1, ?2, ?3, ?4)",
            params![implement, media_ext, media_tag, media_order.as_str()],
        )?;

        Ok(Logic::new(conn.last_insert_rowid(), implement)
            .with_ext(media_ext)
            .with_tag(media_tag)
            .with_order(media_order))
    }

    fn content_url(&self, content: &str) -> String {
        format!("{}{}", self.media_url, content)
    }

    fn media_from_row(&self, row: &Row<'_>) -> rusqlite::Result<MediaRecord> {
        let content: String = row.get(3)?;
        Ok(MediaRecord {
            id: row.get(0)?,
            ext: row.get(1)?,
            tag: row.get(2)?,
            content_url: self.content_url(&content),
            content,
            updated_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
        })
    }
}

async fn copy_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(source, target).await?;
    Ok(())
}

fn logic_from_row(row: &Row<'_>) -> rusqlite::Result<Logic> {
    let media_count: i64 = row.get(6)?;
    Ok(Logic {
        id: row.get(0)?,
        implement: row.get(1)?,
        media_ext: row.get(2)?,
        media_tag: row.get(3)?,
        media_order: MediaOrder::from_stored(&row.get::<_, String>(4)?),
        media_list: row.get(5)?,
        media_count: usize::try_from(media_count).unwrap_or_default(),
        state: row.get(7)?,
    })
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[async_trait]
impl MediaCatalog for SqliteStore {
    async fn list_media(&self, ordering: CatalogOrdering) -> Result<Vec<MediaRecord>, LogicError> {
        let order_by = match ordering {
            CatalogOrdering::Natural => "id ASC",
            CatalogOrdering::IdDescending => "id DESC",
            CatalogOrdering::UpdatedDescending => "updated_at DESC, id DESC",
        };
        let sql = format!("SELECT {} FROM media ORDER BY {}", MEDIA_COLUMNS, order_by);

        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(&sql)?;
        let records = statement
            .query_map([], |row| self.media_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn get_media(&self, id: i64) -> Result<Option<MediaRecord>, LogicError> {
        let sql = format!("SELECT {} FROM media WHERE id = ?1", MEDIA_COLUMNS);
        let conn = self.conn.lock().await;
        let record = conn
            .query_row(&sql, params![id], |row| self.media_from_row(row))
            .optional()?;
        Ok(record)
    }

    async fn read_content(&self, record: &MediaRecord) -> Result<Vec<u8>, LogicError> {
        Ok(fs::read(self.media_root.join(&record.content)).await?)
    }
}

#[async_trait]
impl LogicStore for SqliteStore {
    async fn get_logic(&self, id: i64) -> Result<Option<Logic>, LogicError> {
        let sql = format!("SELECT {} FROM logic WHERE id = ?1", LOGIC_COLUMNS);
        let conn = self.conn.lock().await;
        Ok(conn.query_row(&sql, params![id], logic_from_row).optional()?)
    }

    async fn save_logic(&self, logic: &Logic) -> Result<(), LogicError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO logic (id, implement, media_ext, media_tag, media_order, media_list, media_count, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
               implement = excluded.implement,
               media_ext = excluded.media_ext,
               media_tag = excluded.media_tag,
               media_order = excluded.media_order,
               media_list = excluded.media_list,
               media_count = excluded.media_count,
               state = excluded.state",
            params![
                logic.id,
                logic.implement,
                logic.media_ext,
                logic.media_tag,
                logic.media_order.as_str(),
                logic.media_list,
                i64::try_from(logic.media_count).unwrap_or(i64::MAX),
                logic.state,
            ],
        )?;
        Ok(())
    }

    async fn delete_logic(&self, id: i64) -> Result<bool, LogicError> {
        let conn = self.conn.lock().await;
        Ok(conn.execute("DELETE FROM logic WHERE id = ?1", params![id])? > 0)
    }
}

#[async_trait]
impl TrialStore for SqliteStore {
    async fn get_trial(&self, id: Uuid) -> Result<Option<Trial>, LogicError> {
        let conn = self.conn.lock().await;
        let trial = conn
            .query_row(
                "SELECT logic_id, created_at FROM trial WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok(Trial {
                        id,
                        logic_id: row.get(0)?,
                        created_at: parse_timestamp(1, &row.get::<_, String>(1)?)?,
                    })
                },
            )
            .optional()?;
        Ok(trial)
    }

    async fn save_trial(&self, trial: &Trial) -> Result<(), LogicError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO trial (id, logic_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                trial.id.to_string(),
                trial.logic_id,
                trial.created_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl TempStore for SqliteStore {
    async fn get_temp(&self, key: &CacheKey) -> Result<Option<String>, LogicError> {
        let conn = self.conn.lock().await;
        let content = conn
            .query_row(
                "SELECT content FROM temp WHERE name = ?1",
                params![key.storage_name()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    async fn put_temp(&self, key: &CacheKey, content: &str) -> Result<(), LogicError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO temp (name, content) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET content = excluded.content",
            params![key.storage_name(), content],
        )?;
        Ok(())
    }

    async fn delete_temp(&self, key: &CacheKey) -> Result<bool, LogicError> {
        let conn = self.conn.lock().await;
        Ok(conn.execute("DELETE FROM temp WHERE name = ?1", params![key.storage_name()])? > 0)
    }
}
