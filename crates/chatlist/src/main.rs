use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chatlist_store::Database;

mod config;
mod init;
mod models;
mod output;
mod prompts;
mod results;
mod settings;

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "chatlist",
    about = "Local store for comparing LLM responses across models",
    version
)]
struct Cli {
    /// Path to the database file (default: chatlist.toml override, then
    /// the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. "debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and seed default settings and models
    Init,

    /// Manage prompts
    Prompt {
        #[command(subcommand)]
        action: prompts::PromptAction,
    },

    /// Manage configured model endpoints
    Model {
        #[command(subcommand)]
        action: models::ModelAction,
    },

    /// Record and curate model results
    Result {
        #[command(subcommand)]
        action: results::ResultAction,
    },

    /// List selected (favorite) results across all prompts
    Selected {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read or write configuration settings
    Setting {
        #[command(subcommand)]
        action: settings::SettingAction,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    let db_path = cli
        .db
        .clone()
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(Database::default_path);

    match cli.command {
        Command::Init => init::handle_init(&db_path),
        Command::Prompt { action } => prompts::handle_prompt_command(
            &open_db(&db_path)?,
            action,
            config.default_author.as_deref(),
        ),
        Command::Model { action } => models::handle_model_command(&open_db(&db_path)?, action),
        Command::Result { action } => results::handle_result_command(&open_db(&db_path)?, action),
        Command::Selected { json } => results::handle_selected_command(&open_db(&db_path)?, json),
        Command::Setting { action } => {
            settings::handle_setting_command(&open_db(&db_path)?, action)
        }
    }
}

fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    tracing::debug!(path = %db_path.display(), "opening database");
    Database::open_at(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
