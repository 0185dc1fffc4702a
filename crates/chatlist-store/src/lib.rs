//! Storage core for chatlist.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and exposes domain-specific stores: prompts, models, results and
//! settings.
//!
//! Every operation takes the connection lock for its duration, so a
//! `Database` behind an `Arc` can be shared between a UI thread and a
//! background worker that records results; multi-row operations (cascade
//! deletes, bulk selection) run in a transaction and are all-or-nothing.
//! Operations block on disk I/O and should not be called from a context
//! that must stay responsive.

mod error;
mod models;
mod prompts;
mod results;
mod settings;

pub use error::{StoreError, StoreResult};
pub use models::{ModelRecord, Models};
pub use prompts::{PromptFilter, PromptRecord, Prompts};
pub use results::{PromptResult, ResultRecord, Results, SelectedResult};
pub use settings::{AppSettings, Settings};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Author recorded on prompts when neither the caller nor the
/// `default_author` setting provides one.
pub const DEFAULT_AUTHOR: &str = "user";

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Starter model catalog seeded on first run. OpenRouter speaks the
/// OpenAI-compatible completions format; the direct endpoints need their
/// own keys.
const STARTER_MODELS: &[(&str, &str, &str)] = &[
    ("GPT-4o (OpenRouter)", OPENROUTER_URL, "openai/gpt-4o"),
    ("GPT-4o-mini (OpenRouter)", OPENROUTER_URL, "openai/gpt-4o-mini"),
    (
        "Claude 3.5 Sonnet (OpenRouter)",
        OPENROUTER_URL,
        "anthropic/claude-3.5-sonnet",
    ),
    (
        "Gemini Pro 1.5 (OpenRouter)",
        OPENROUTER_URL,
        "google/gemini-pro-1.5",
    ),
    (
        "DeepSeek V3 (OpenRouter)",
        OPENROUTER_URL,
        "deepseek/deepseek-chat",
    ),
    (
        "Llama 3.3 70B (OpenRouter)",
        OPENROUTER_URL,
        "meta-llama/llama-3.3-70b-instruct",
    ),
    (
        "Mistral 7B (OpenRouter)",
        OPENROUTER_URL,
        "mistralai/mistral-7b-instruct",
    ),
    (
        "GPT-4o (Direct)",
        "https://api.openai.com/v1/chat/completions",
        "gpt-4o",
    ),
    (
        "Claude 3.5 Sonnet (Direct)",
        "https://api.anthropic.com/v1/messages",
        "claude-3-5-sonnet-20241022",
    ),
];

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/chatlist/chatlist.db`.
    pub fn open() -> StoreResult<Self> {
        let db_path = Self::default_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatlist")
            .join("chatlist.db")
    }

    /// Access the prompts store.
    pub fn prompts(&self) -> Prompts<'_> {
        Prompts::new(self.lock())
    }

    /// Access the models store.
    pub fn models(&self) -> Models<'_> {
        Models::new(self.lock())
    }

    /// Access the results store.
    pub fn results(&self) -> Results<'_> {
        Results::new(self.lock())
    }

    /// Access the settings store.
    pub fn settings(&self) -> Settings<'_> {
        Settings::new(self.lock())
    }

    /// Seed default settings and the starter model catalog.
    ///
    /// Idempotent: rows that already exist are left untouched, so this is
    /// safe to run on every startup.
    pub fn seed_defaults(&self) -> StoreResult<()> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;

        let defaults = AppSettings::default();
        let settings: &[(&str, String)] = &[
            ("theme", defaults.theme),
            ("default_author", defaults.default_author),
            ("request_timeout", defaults.request_timeout_secs.to_string()),
        ];
        for (key, value) in settings {
            tx.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        for (name, api_url, api_id) in STARTER_MODELS {
            tx.execute(
                "INSERT OR IGNORE INTO models (name, api_url, api_id, is_active) VALUES (?1, ?2, ?3, 1)",
                params![name, api_url, api_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Database lock poisoned")
    }

    /// Initialize the database schema.
    ///
    /// The `REFERENCES` clauses document ownership; cascades are enforced
    /// by explicit deletes inside the stores' transactions rather than by
    /// foreign-key triggers.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS models (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                api_url TEXT NOT NULL,
                api_id TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prompt_id INTEGER NOT NULL REFERENCES prompts(id),
                model_id INTEGER NOT NULL REFERENCES models(id),
                response_text TEXT NOT NULL,
                is_selected INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_prompts_text ON prompts(text);
            CREATE INDEX IF NOT EXISTS idx_prompts_created ON prompts(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_models_active ON models(is_active);
            CREATE INDEX IF NOT EXISTS idx_results_prompt ON results(prompt_id);
            CREATE INDEX IF NOT EXISTS idx_results_selected ON results(is_selected);
            "#,
        )
    }
}

/// Fixed-width RFC 3339 in UTC so the text ordering of stored timestamps
/// matches the chronological ordering.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_prompt() {
        let db = Database::open_in_memory().unwrap();

        let added = db.prompts().add("explain borrowing", Some("alice")).unwrap();
        assert!(added.id > 0);

        let retrieved = db.prompts().get(added.id).unwrap().unwrap();
        assert_eq!(retrieved.text, "explain borrowing");
        assert_eq!(retrieved.author, "alice");
    }

    #[test]
    fn test_author_falls_back_to_setting() {
        let db = Database::open_in_memory().unwrap();

        // No setting yet: hard-coded default
        let p1 = db.prompts().add("first", None).unwrap();
        assert_eq!(p1.author, DEFAULT_AUTHOR);

        db.settings().set("default_author", "bob").unwrap();
        let p2 = db.prompts().add("second", None).unwrap();
        assert_eq!(p2.author, "bob");
    }

    #[test]
    fn test_delete_unknown_prompt() {
        let db = Database::open_in_memory().unwrap();

        let err = db.prompts().delete(999).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_seed_defaults_idempotent() {
        let db = Database::open_in_memory().unwrap();

        db.seed_defaults().unwrap();
        let models_after_first = db.models().list_all().unwrap().len();
        let theme = db.settings().get("theme").unwrap();
        assert_eq!(theme.as_deref(), Some("dark"));
        assert!(models_after_first > 0);

        // Second run must not duplicate or overwrite
        db.settings().set("theme", "light").unwrap();
        db.seed_defaults().unwrap();
        assert_eq!(db.models().list_all().unwrap().len(), models_after_first);
        assert_eq!(db.settings().get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_settings_load_save_app() {
        let db = Database::open_in_memory().unwrap();

        let loaded = db.settings().load_app().unwrap();
        assert_eq!(loaded.theme, "dark");
        assert_eq!(loaded.request_timeout_secs, 30);

        let custom = AppSettings {
            theme: "light".to_string(),
            default_author: "carol".to_string(),
            request_timeout_secs: 60,
        };
        db.settings().save_app(&custom).unwrap();

        let reloaded = db.settings().load_app().unwrap();
        assert_eq!(reloaded.theme, "light");
        assert_eq!(reloaded.default_author, "carol");
        assert_eq!(reloaded.request_timeout_secs, 60);
    }
}
