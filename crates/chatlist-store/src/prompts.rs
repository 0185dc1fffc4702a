//! Prompt store.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::{StoreError, StoreResult};
use crate::{format_timestamp, parse_timestamp, settings};

/// A stored prompt. Immutable after creation apart from deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Filter options for listing prompts.
///
/// `search` matches a substring anywhere in the prompt text using SQLite
/// `LIKE`: ASCII letters compare case-insensitively, everything beyond
/// ASCII compares case-sensitively.
#[derive(Debug, Default, Clone)]
pub struct PromptFilter {
    pub search: Option<String>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Prompts store with a borrowed connection.
pub struct Prompts<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Prompts<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert a new prompt and return it with its assigned id.
    ///
    /// When `author` is not given it falls back to the `default_author`
    /// setting, then to `"user"`.
    pub fn add(&self, text: &str, author: Option<&str>) -> StoreResult<PromptRecord> {
        if text.trim().is_empty() {
            return Err(StoreError::validation("prompt text must not be empty"));
        }

        let author = match author {
            Some(a) => a.to_string(),
            None => settings::default_author(&self.conn)?,
        };
        let created_at = Utc::now();

        self.conn.execute(
            "INSERT INTO prompts (text, author, created_at) VALUES (?1, ?2, ?3)",
            params![text, author, format_timestamp(created_at)],
        )?;

        Ok(PromptRecord {
            id: self.conn.last_insert_rowid(),
            text: text.to_string(),
            author,
            created_at,
        })
    }

    /// Get a prompt by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<PromptRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, text, author, created_at FROM prompts WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// List prompts matching the filter, newest first.
    pub fn list(&self, filter: &PromptFilter) -> StoreResult<Vec<PromptRecord>> {
        let mut sql =
            String::from("SELECT id, text, author, created_at FROM prompts WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref search) = filter.search {
            sql.push_str(" AND text LIKE ?");
            param_values.push(Box::new(format!("%{}%", search)));
        }

        if let Some(after) = filter.after {
            sql.push_str(" AND created_at >= ?");
            param_values.push(Box::new(format_timestamp(after)));
        }

        if let Some(before) = filter.before {
            sql.push_str(" AND created_at <= ?");
            param_values.push(Box::new(format_timestamp(before)));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Delete a prompt and all results that reference it, atomically.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let cascaded = tx.execute("DELETE FROM results WHERE prompt_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        if rows == 0 {
            // Dropping the transaction rolls the cascade back.
            return Err(StoreError::not_found("prompt", id));
        }

        tx.commit()?;
        tracing::debug!(prompt_id = id, cascaded, "deleted prompt");
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<PromptRecord, rusqlite::Error> {
        let created_at_str: String = row.get(3)?;

        Ok(PromptRecord {
            id: row.get(0)?,
            text: row.get(1)?,
            author: row.get(2)?,
            created_at: parse_timestamp(&created_at_str),
        })
    }
}
