//! First-run initialization for chatlist.
//!
//! Creates the database and seeds default settings plus the starter model
//! catalog.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use chatlist_store::Database;

pub fn handle_init(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let existed = db_path.exists();
    let db = Database::open_at(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    db.seed_defaults()?;

    if existed {
        eprintln!(
            "{} Database already exists at {} (defaults topped up)",
            "⚠".bright_yellow(),
            db_path.display()
        );
    } else {
        eprintln!(
            "{} Created database at {}",
            "✓".bright_green(),
            db_path.display()
        );
    }

    let models = db.models().list_all()?;
    eprintln!("{} {} model(s) configured", "✓".bright_green(), models.len());

    print_getting_started();

    Ok(())
}

/// Print the getting started guide
fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Add a prompt: {}",
        "1.".dimmed(),
        "chatlist prompt add \"your question\"".bright_cyan()
    );
    eprintln!(
        "  {} See configured models: {}",
        "2.".dimmed(),
        "chatlist model list".bright_cyan()
    );
    eprintln!(
        "  {} Record a response: {}",
        "3.".dimmed(),
        "chatlist result add <prompt-id> <model-id> --text \"...\"".bright_cyan()
    );
    eprintln!(
        "  {} Mark favorites: {}",
        "4.".dimmed(),
        "chatlist result select <result-id> ...".bright_cyan()
    );
    eprintln!(
        "  {} Review them: {}",
        "5.".dimmed(),
        "chatlist selected".bright_cyan()
    );
}
