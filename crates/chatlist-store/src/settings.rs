//! Key-value settings store.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::StoreResult;
use crate::DEFAULT_AUTHOR;

/// Typed view over the well-known settings keys.
///
/// This is the explicit load/save boundary for application configuration:
/// components take an `AppSettings` by value instead of reading the
/// settings table ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: String,
    pub default_author: String,
    pub request_timeout_secs: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_author: DEFAULT_AUTHOR.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Settings store with a borrowed connection.
pub struct Settings<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Settings<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Get a setting value. A missing key and a key stored with a NULL
    /// value both come back as `None`.
    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        get_value(&self.conn, key)
    }

    /// Set a setting value, inserting or overwriting by key.
    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a setting. Returns false when the key was not present.
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    /// Load the well-known settings, falling back to defaults for keys
    /// that are missing or unparseable.
    pub fn load_app(&self) -> StoreResult<AppSettings> {
        let defaults = AppSettings::default();
        let timeout = match get_value(&self.conn, "request_timeout")? {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid request_timeout setting, using default");
                defaults.request_timeout_secs
            }),
            None => defaults.request_timeout_secs,
        };

        Ok(AppSettings {
            theme: get_value(&self.conn, "theme")?.unwrap_or(defaults.theme),
            default_author: get_value(&self.conn, "default_author")?
                .unwrap_or(defaults.default_author),
            request_timeout_secs: timeout,
        })
    }

    /// Persist the well-known settings back to the table.
    pub fn save_app(&self, settings: &AppSettings) -> StoreResult<()> {
        self.set("theme", &settings.theme)?;
        self.set("default_author", &settings.default_author)?;
        self.set("request_timeout", &settings.request_timeout_secs.to_string())?;
        Ok(())
    }
}

fn get_value(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(value.flatten())
}

/// The author recorded on prompts when the caller does not supply one.
pub(crate) fn default_author(conn: &Connection) -> StoreResult<String> {
    Ok(get_value(conn, "default_author")?.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()))
}
