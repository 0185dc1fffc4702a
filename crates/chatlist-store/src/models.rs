//! Model store.
//!
//! A model row describes a configured LLM endpoint: display name, API URL
//! and the provider-side model identifier. Credentials are never stored
//! here; the calling layer supplies them out-of-band.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::{StoreError, StoreResult};

/// A configured model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: i64,
    pub name: String,
    pub api_url: String,
    pub api_id: String,
    pub is_active: bool,
}

/// Models store with a borrowed connection.
pub struct Models<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Models<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert a new model. The display name must be globally unique.
    pub fn add(&self, name: &str, api_url: &str, api_id: &str) -> StoreResult<ModelRecord> {
        validate_fields(name, api_url, api_id)?;

        self.conn
            .execute(
                "INSERT INTO models (name, api_url, api_id, is_active) VALUES (?1, ?2, ?3, 1)",
                params![name, api_url, api_id],
            )
            .map_err(|e| {
                StoreError::constraint(e, format!("model name '{}' already exists", name))
            })?;

        Ok(ModelRecord {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            api_url: api_url.to_string(),
            api_id: api_id.to_string(),
            is_active: true,
        })
    }

    /// Get a model by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<ModelRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, name, api_url, api_id, is_active FROM models WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Update a model's identity fields and active flag.
    pub fn update(&self, record: &ModelRecord) -> StoreResult<()> {
        validate_fields(&record.name, &record.api_url, &record.api_id)?;

        let rows = self
            .conn
            .execute(
                "UPDATE models SET name = ?1, api_url = ?2, api_id = ?3, is_active = ?4 WHERE id = ?5",
                params![record.name, record.api_url, record.api_id, record.is_active, record.id],
            )
            .map_err(|e| {
                StoreError::constraint(e, format!("model name '{}' already exists", record.name))
            })?;

        if rows == 0 {
            return Err(StoreError::not_found("model", record.id));
        }
        Ok(())
    }

    /// Set the active flag. Idempotent: re-applying the current value is
    /// not an error.
    pub fn set_active(&self, id: i64, active: bool) -> StoreResult<()> {
        let rows = self.conn.execute(
            "UPDATE models SET is_active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found("model", id));
        }
        Ok(())
    }

    /// List active models in insertion order.
    pub fn list_active(&self) -> StoreResult<Vec<ModelRecord>> {
        self.list_where("WHERE is_active = 1")
    }

    /// List all models, active or not, in insertion order.
    pub fn list_all(&self) -> StoreResult<Vec<ModelRecord>> {
        self.list_where("")
    }

    /// Delete a model and all results it produced, atomically.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let cascaded = tx.execute("DELETE FROM results WHERE model_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM models WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::not_found("model", id));
        }

        tx.commit()?;
        tracing::debug!(model_id = id, cascaded, "deleted model");
        Ok(())
    }

    fn list_where(&self, clause: &str) -> StoreResult<Vec<ModelRecord>> {
        let sql = format!(
            "SELECT id, name, api_url, api_id, is_active FROM models {} ORDER BY id",
            clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<ModelRecord, rusqlite::Error> {
        Ok(ModelRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            api_url: row.get(2)?,
            api_id: row.get(3)?,
            is_active: row.get(4)?,
        })
    }
}

fn validate_fields(name: &str, api_url: &str, api_id: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::validation("model name must not be empty"));
    }
    if api_url.trim().is_empty() {
        return Err(StoreError::validation("model api_url must not be empty"));
    }
    if api_id.trim().is_empty() {
        return Err(StoreError::validation("model api_id must not be empty"));
    }
    Ok(())
}
