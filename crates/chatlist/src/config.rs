//! Project configuration file support for chatlist.
//!
//! Loads configuration from `chatlist.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project-level configuration loaded from `chatlist.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Override for the database file location
    pub db_path: Option<PathBuf>,
    /// Author recorded on new prompts when --author is not given
    pub default_author: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "chatlist.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ProjectConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parses_known_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "db_path = \"/tmp/test.db\"\ndefault_author = \"alice\"\n",
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.db_path.as_deref(), Some(Path::new("/tmp/test.db")));
        assert_eq!(config.default_author.as_deref(), Some("alice"));
    }

    #[test]
    fn unknown_fields_are_a_hard_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "nonsense = 1\n").unwrap();

        assert!(ProjectConfig::load(dir.path()).is_err());
    }
}
