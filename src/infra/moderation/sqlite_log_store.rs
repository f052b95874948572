// SQLite-backed moderation log store.
//
// Tables:
// - moderation_log: One row per computed decision, append-only

use crate::core::moderation::{
    MediaType, ModerationError, ModerationLogEntry, ModerationLogStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteModerationLogStore {
    pool: Pool<Sqlite>,
}

impl SqliteModerationLogStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderation_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                media_type TEXT NOT NULL,
                approved BOOLEAN NOT NULL,
                confidence REAL NOT NULL,
                categories TEXT NOT NULL,
                moderated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_moderation_log_moderated_at
                ON moderation_log(moderated_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

fn media_type_from_str(raw: &str) -> MediaType {
    match raw {
        "image" => MediaType::Image,
        "audio" => MediaType::Audio,
        _ => MediaType::Text,
    }
}

#[async_trait]
impl ModerationLogStore for SqliteModerationLogStore {
    async fn record_decision(&self, entry: ModerationLogEntry) -> Result<(), ModerationError> {
        let categories = serde_json::to_string(&entry.categories)
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO moderation_log (content, media_type, approved, confidence, categories, moderated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.content)
        .bind(entry.media_type.to_string())
        .bind(entry.approved)
        .bind(entry.confidence)
        .bind(categories)
        .bind(entry.moderated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }

    async fn recent_decisions(
        &self,
        limit: u32,
    ) -> Result<Vec<ModerationLogEntry>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT content, media_type, approved, confidence, categories, moderated_at
            FROM moderation_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let media_type: String = row.get("media_type");
            let categories_json: String = row.get("categories");
            let moderated_at_str: String = row.get("moderated_at");
            let moderated_at = DateTime::parse_from_rfc3339(&moderated_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());

            entries.push(ModerationLogEntry {
                content: row.get("content"),
                media_type: media_type_from_str(&media_type),
                approved: row.get("approved"),
                confidence: row.get("confidence"),
                categories: serde_json::from_str(&categories_json).unwrap_or_default(),
                moderated_at,
            });
        }
        Ok(entries)
    }
}
