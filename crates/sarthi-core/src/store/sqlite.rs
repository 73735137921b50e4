//! SQLite-backed material and message stores.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{SarthiError, SarthiResult};
use crate::traits::{MaterialStore, MaterialSummary, MessageStore};
use crate::types::{
    ChatRole, NewMaterial, ProcessingStatus, SourceType, StoredMessage, StudyMaterial,
};

/// Relational store on SQLite. Safe for concurrent use by multiple workers;
/// operations are short and serialized on the connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at `db_path`.
    pub fn new(db_path: impl AsRef<Path>) -> SarthiResult<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = if db_path.as_ref().to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            Connection::open(db_path.as_ref())
        }
        .map_err(|e| SarthiError::database(e.to_string()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.create_tables()?;
        Ok(store)
    }

    /// Ephemeral store for tests and local runs.
    pub fn in_memory() -> SarthiResult<Self> {
        Self::new(":memory:")
    }

    fn create_tables(&self) -> SarthiResult<()> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS study_material (
                id           TEXT PRIMARY KEY,
                frame_id     TEXT NOT NULL,
                owner_id     TEXT NOT NULL,
                title        TEXT NOT NULL,
                source_type  TEXT NOT NULL,
                source_uri   TEXT NOT NULL,
                storage_id   TEXT,
                status       TEXT NOT NULL,
                summary      TEXT,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_material_frame
                ON study_material(frame_id, owner_id);

            CREATE TABLE IF NOT EXISTS message (
                id           TEXT PRIMARY KEY,
                frame_id     TEXT NOT NULL,
                owner_id     TEXT NOT NULL,
                role         TEXT NOT NULL,
                content      TEXT NOT NULL,
                created_at   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_message_frame
                ON message(frame_id, created_at);
            "#,
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(())
    }

    fn row_to_material(row: &Row<'_>) -> rusqlite::Result<StudyMaterial> {
        let source_type: String = row.get("source_type")?;
        let status: String = row.get("status")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;
        Ok(StudyMaterial {
            id: row.get("id")?,
            frame_id: row.get("frame_id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            source_type: SourceType::parse(&source_type).unwrap_or(SourceType::WebpageLink),
            source_uri: row.get("source_uri")?,
            storage_id: row.get("storage_id")?,
            status: ProcessingStatus::parse(&status).unwrap_or(ProcessingStatus::Failed),
            summary: row.get("summary")?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }

    fn current_status(conn: &Connection, material_id: &str) -> SarthiResult<ProcessingStatus> {
        let status: String = conn
            .query_row(
                "SELECT status FROM study_material WHERE id = ?1",
                params![material_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    SarthiError::not_found(format!("material {material_id}"))
                }
                other => SarthiError::database(other.to_string()),
            })?;
        ProcessingStatus::parse(&status)
            .ok_or_else(|| SarthiError::database(format!("corrupt status value: {status}")))
    }

    fn write_status(
        conn: &Connection,
        material_id: &str,
        status: ProcessingStatus,
    ) -> SarthiResult<()> {
        conn.execute(
            "UPDATE study_material SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), fmt_timestamp(Utc::now()), material_id],
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(())
    }
}

/// Fixed-width RFC 3339 so timestamps compare correctly as strings in SQL.
fn fmt_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl MaterialStore for SqliteStore {
    async fn insert(&self, material: NewMaterial) -> SarthiResult<StudyMaterial> {
        let now = Utc::now();
        let stored = StudyMaterial {
            id: Uuid::new_v4().to_string(),
            frame_id: material.frame_id,
            owner_id: material.owner_id,
            title: material.title,
            source_type: material.source_type,
            source_uri: material.source_uri,
            storage_id: material.storage_id,
            status: ProcessingStatus::Pending,
            summary: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute(
            r#"INSERT INTO study_material
               (id, frame_id, owner_id, title, source_type, source_uri, storage_id, status, summary, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                stored.id,
                stored.frame_id,
                stored.owner_id,
                stored.title,
                stored.source_type.as_str(),
                stored.source_uri,
                stored.storage_id,
                stored.status.as_str(),
                stored.summary,
                fmt_timestamp(stored.created_at),
                fmt_timestamp(stored.updated_at),
            ],
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(stored)
    }

    async fn get(&self, material_id: &str) -> SarthiResult<Option<StudyMaterial>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let result = conn.query_row(
            "SELECT * FROM study_material WHERE id = ?1",
            params![material_id],
            Self::row_to_material,
        );
        match result {
            Ok(material) => Ok(Some(material)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SarthiError::database(e.to_string())),
        }
    }

    async fn set_status(&self, material_id: &str, status: ProcessingStatus) -> SarthiResult<()> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let current = Self::current_status(&conn, material_id)?;
        if current == status {
            // Idempotent re-set, e.g. a retried job re-entering Processing.
            return Ok(());
        }
        if !current.can_transition_to(status) {
            return Err(SarthiError::database(format!(
                "illegal status transition {} -> {} for material {material_id}",
                current.as_str(),
                status.as_str()
            )));
        }
        Self::write_status(&conn, material_id, status)
    }

    async fn set_completed(&self, material_id: &str, summary: Option<String>) -> SarthiResult<()> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let current = Self::current_status(&conn, material_id)?;
        if !current.can_transition_to(ProcessingStatus::Completed) {
            return Err(SarthiError::database(format!(
                "illegal status transition {} -> completed for material {material_id}",
                current.as_str()
            )));
        }
        conn.execute(
            "UPDATE study_material SET status = ?1, summary = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                ProcessingStatus::Completed.as_str(),
                summary,
                fmt_timestamp(Utc::now()),
                material_id
            ],
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(())
    }

    async fn frame_summaries(
        &self,
        owner_id: &str,
        frame_id: &str,
    ) -> SarthiResult<Vec<MaterialSummary>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT title, summary FROM study_material
                 WHERE owner_id = ?1 AND frame_id = ?2 AND summary IS NOT NULL
                 ORDER BY created_at",
            )
            .map_err(|e| SarthiError::database(e.to_string()))?;
        let rows = stmt
            .query_map(params![owner_id, frame_id], |row| {
                Ok(MaterialSummary {
                    title: row.get(0)?,
                    summary: row.get(1)?,
                })
            })
            .map_err(|e| SarthiError::database(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SarthiError::database(e.to_string()))
    }

    async fn stale_pending(&self, cutoff: DateTime<Utc>) -> SarthiResult<Vec<StudyMaterial>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT * FROM study_material WHERE status = 'pending' AND created_at < ?1",
            )
            .map_err(|e| SarthiError::database(e.to_string()))?;
        let rows = stmt
            .query_map(params![fmt_timestamp(cutoff)], Self::row_to_material)
            .map_err(|e| SarthiError::database(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SarthiError::database(e.to_string()))
    }

    async fn delete_frame(&self, owner_id: &str, frame_id: &str) -> SarthiResult<()> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute(
            "DELETE FROM study_material WHERE owner_id = ?1 AND frame_id = ?2",
            params![owner_id, frame_id],
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert(
        &self,
        frame_id: &str,
        owner_id: &str,
        role: ChatRole,
        content: &str,
    ) -> SarthiResult<StoredMessage> {
        let message = StoredMessage {
            id: Uuid::new_v4().to_string(),
            frame_id: frame_id.to_string(),
            owner_id: owner_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute(
            "INSERT INTO message (id, frame_id, owner_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.frame_id,
                message.owner_id,
                message.role.as_str(),
                message.content,
                fmt_timestamp(message.created_at),
            ],
        )
        .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(message)
    }

    async fn recent(&self, frame_id: &str, limit: usize) -> SarthiResult<Vec<StoredMessage>> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT id, frame_id, owner_id, role, content, created_at FROM message
                 WHERE frame_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )
            .map_err(|e| SarthiError::database(e.to_string()))?;
        let rows = stmt
            .query_map(params![frame_id, limit as i64], |row| {
                let role: String = row.get(3)?;
                let created_at: String = row.get(5)?;
                Ok(StoredMessage {
                    id: row.get(0)?,
                    frame_id: row.get(1)?,
                    owner_id: row.get(2)?,
                    role: ChatRole::parse(&role).unwrap_or(ChatRole::User),
                    content: row.get(4)?,
                    created_at: parse_timestamp(&created_at),
                })
            })
            .map_err(|e| SarthiError::database(e.to_string()))?;
        let mut messages = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SarthiError::database(e.to_string()))?;
        messages.reverse();
        Ok(messages)
    }

    async fn delete_frame(&self, frame_id: &str) -> SarthiResult<()> {
        let conn = self.conn.lock().expect("sqlite lock poisoned");
        conn.execute("DELETE FROM message WHERE frame_id = ?1", params![frame_id])
            .map_err(|e| SarthiError::database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(frame: &str, owner: &str) -> NewMaterial {
        NewMaterial {
            frame_id: frame.into(),
            owner_id: owner.into(),
            title: "Notes".into(),
            source_type: SourceType::Pdf,
            source_uri: "https://example.com/notes.pdf".into(),
            storage_id: Some("file-1".into()),
        }
    }

    #[tokio::test]
    async fn insert_starts_pending() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = MaterialStore::insert(&store, material("f1", "u1")).await.unwrap();
        assert_eq!(stored.status, ProcessingStatus::Pending);
        assert!(stored.summary.is_none());

        let loaded = store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, stored.id);
        assert_eq!(loaded.source_type, SourceType::Pdf);
    }

    #[tokio::test]
    async fn status_transitions_are_enforced() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = MaterialStore::insert(&store, material("f1", "u1")).await.unwrap();

        // pending -> completed skips processing
        assert!(store
            .set_status(&stored.id, ProcessingStatus::Completed)
            .await
            .is_err());

        store
            .set_status(&stored.id, ProcessingStatus::Processing)
            .await
            .unwrap();
        // re-setting the same status is an idempotent no-op
        store
            .set_status(&stored.id, ProcessingStatus::Processing)
            .await
            .unwrap();
        store
            .set_completed(&stored.id, Some("summary".into()))
            .await
            .unwrap();

        // completed is terminal
        assert!(store
            .set_status(&stored.id, ProcessingStatus::Processing)
            .await
            .is_err());

        let loaded = store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ProcessingStatus::Completed);
        assert_eq!(loaded.summary.as_deref(), Some("summary"));
    }

    #[tokio::test]
    async fn frame_summaries_only_include_summarized() {
        let store = SqliteStore::in_memory().unwrap();
        let a = MaterialStore::insert(&store, material("f1", "u1")).await.unwrap();
        let _b = MaterialStore::insert(&store, material("f1", "u1")).await.unwrap();

        store
            .set_status(&a.id, ProcessingStatus::Processing)
            .await
            .unwrap();
        store.set_completed(&a.id, Some("about cells".into())).await.unwrap();

        let summaries = store.frame_summaries("u1", "f1").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].summary, "about cells");
    }

    #[tokio::test]
    async fn stale_pending_scan_finds_old_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = MaterialStore::insert(&store, material("f1", "u1")).await.unwrap();

        let past = Utc::now() - chrono::Duration::seconds(60);
        assert!(store.stale_pending(past).await.unwrap().is_empty());

        let future = Utc::now() + chrono::Duration::seconds(60);
        let stale = store.stale_pending(future).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, stored.id);
    }

    #[tokio::test]
    async fn messages_round_trip_in_order() {
        let store = SqliteStore::in_memory().unwrap();
        for i in 0..5 {
            MessageStore::insert(&store, "f1", "u1", ChatRole::User, &format!("msg {i}"))
                .await
                .unwrap();
        }
        MessageStore::insert(&store, "f2", "u1", ChatRole::User, "other frame")
            .await
            .unwrap();

        let recent = store.recent("f1", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 2");
        assert_eq!(recent[2].content, "msg 4");
    }
}
