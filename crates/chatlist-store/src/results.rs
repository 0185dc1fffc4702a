//! Result store.
//!
//! A result is one model's response to one prompt. Results are written by
//! the model-calling layer once a response arrives; the only field that
//! changes afterwards is the user-curated `is_selected` flag.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::{StoreError, StoreResult};
use crate::{format_timestamp, parse_timestamp};

/// A stored result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: i64,
    pub prompt_id: i64,
    pub model_id: i64,
    pub response_text: String,
    pub is_selected: bool,
    pub created_at: DateTime<Utc>,
}

/// A result joined with the producing model's display name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    #[serde(flatten)]
    pub result: ResultRecord,
    pub model_name: String,
}

/// A selected result joined with its prompt text and model name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedResult {
    #[serde(flatten)]
    pub result: ResultRecord,
    pub prompt_text: String,
    pub model_name: String,
}

/// Results store with a borrowed connection.
pub struct Results<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Results<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert a new result for a prompt/model pair.
    ///
    /// Both referenced rows must exist; the checks run inside the insert
    /// transaction so a concurrent delete cannot leave a dangling result.
    pub fn add(
        &self,
        prompt_id: i64,
        model_id: i64,
        response_text: &str,
    ) -> StoreResult<ResultRecord> {
        if response_text.trim().is_empty() {
            return Err(StoreError::validation("response text must not be empty"));
        }

        let tx = self.conn.unchecked_transaction()?;

        if !row_exists(&tx, "SELECT 1 FROM prompts WHERE id = ?1", prompt_id)? {
            return Err(StoreError::not_found("prompt", prompt_id));
        }
        if !row_exists(&tx, "SELECT 1 FROM models WHERE id = ?1", model_id)? {
            return Err(StoreError::not_found("model", model_id));
        }

        let created_at = Utc::now();
        tx.execute(
            r#"
            INSERT INTO results (prompt_id, model_id, response_text, is_selected, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
            params![prompt_id, model_id, response_text, format_timestamp(created_at)],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;

        Ok(ResultRecord {
            id,
            prompt_id,
            model_id,
            response_text: response_text.to_string(),
            is_selected: false,
            created_at,
        })
    }

    /// Results for one prompt joined with the model name, oldest first.
    ///
    /// Errors with `NotFound` when the prompt id itself is unknown; a
    /// prompt with no results yet returns an empty Vec.
    pub fn for_prompt(&self, prompt_id: i64) -> StoreResult<Vec<PromptResult>> {
        if !row_exists(&self.conn, "SELECT 1 FROM prompts WHERE id = ?1", prompt_id)? {
            return Err(StoreError::not_found("prompt", prompt_id));
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.id, r.prompt_id, r.model_id, r.response_text, r.is_selected, r.created_at,
                   m.name
            FROM results r
            JOIN models m ON r.model_id = m.id
            WHERE r.prompt_id = ?1
            ORDER BY r.created_at ASC, r.id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![prompt_id], |row| {
            Ok(PromptResult {
                result: row_to_record(row)?,
                model_name: row.get(6)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Bulk-set the selected flag on a set of result ids.
    ///
    /// One atomic update; ids that do not exist are silently skipped.
    /// Returns the number of rows actually updated.
    pub fn set_selected(&self, ids: &[i64], selected: bool) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "UPDATE results SET is_selected = ? WHERE id IN ({})",
            placeholders
        );

        let mut params: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(ids.len() + 1);
        params.push(&selected);
        for id in ids {
            params.push(id);
        }

        let changed = tx.execute(&sql, params.as_slice())?;
        tx.commit()?;

        if changed < ids.len() {
            tracing::debug!(
                requested = ids.len(),
                changed,
                "skipped unknown result ids in bulk selection"
            );
        }

        Ok(changed)
    }

    /// All selected results across prompts, newest first, joined with the
    /// prompt text and model name.
    pub fn list_selected(&self) -> StoreResult<Vec<SelectedResult>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.id, r.prompt_id, r.model_id, r.response_text, r.is_selected, r.created_at,
                   p.text, m.name
            FROM results r
            JOIN prompts p ON r.prompt_id = p.id
            JOIN models m ON r.model_id = m.id
            WHERE r.is_selected = 1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SelectedResult {
                result: row_to_record(row)?,
                prompt_text: row.get(6)?,
                model_name: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Get a result by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<ResultRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, prompt_id, model_id, response_text, is_selected, created_at
                FROM results WHERE id = ?1
                "#,
                params![id],
                |row| row_to_record(row),
            )
            .optional()?;
        Ok(record)
    }

    /// Delete a single result by id.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM results WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::not_found("result", id));
        }
        Ok(())
    }
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> Result<bool, rusqlite::Error> {
    let found = conn.query_row(sql, params![id], |_| Ok(())).optional()?;
    Ok(found.is_some())
}

fn row_to_record(row: &rusqlite::Row) -> Result<ResultRecord, rusqlite::Error> {
    let created_at_str: String = row.get(5)?;

    Ok(ResultRecord {
        id: row.get(0)?,
        prompt_id: row.get(1)?,
        model_id: row.get(2)?,
        response_text: row.get(3)?,
        is_selected: row.get(4)?,
        created_at: parse_timestamp(&created_at_str),
    })
}
