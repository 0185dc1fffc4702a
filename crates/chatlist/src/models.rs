use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use chatlist_store::{Database, ModelRecord};

use crate::output::active_glyph;

#[derive(Subcommand, Debug)]
pub enum ModelAction {
    /// Add a new model endpoint
    Add {
        /// Display name (must be unique)
        name: String,

        /// API endpoint URL
        api_url: String,

        /// Provider-side model identifier
        api_id: String,
    },

    /// List configured models
    List {
        /// Include deactivated models
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Activate a model
    Enable {
        /// Model ID
        id: i64,
    },

    /// Deactivate a model without deleting its results
    Disable {
        /// Model ID
        id: i64,
    },

    /// Delete a model and all results it produced
    Delete {
        /// Model ID
        id: i64,
    },
}

pub fn handle_model_command(db: &Database, action: ModelAction) -> Result<()> {
    match action {
        ModelAction::Add {
            name,
            api_url,
            api_id,
        } => {
            let model = db.models().add(&name, &api_url, &api_id)?;
            println!(
                "{} Added model #{} '{}'",
                "✓".bright_green(),
                model.id,
                model.name
            );
        }
        ModelAction::List { all, json } => {
            let models = if all {
                db.models().list_all()?
            } else {
                db.models().list_active()?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else if models.is_empty() {
                println!("{}", "No models configured. Run 'chatlist init'.".dimmed());
            } else {
                print_models_table(&models);
            }
        }
        ModelAction::Enable { id } => {
            db.models().set_active(id, true)?;
            println!("{} Model #{} enabled", "✓".bright_green(), id);
        }
        ModelAction::Disable { id } => {
            db.models().set_active(id, false)?;
            println!("{} Model #{} disabled", "✓".bright_green(), id);
        }
        ModelAction::Delete { id } => {
            db.models().delete(id)?;
            println!(
                "{} Deleted model #{} and its results",
                "✓".bright_green(),
                id
            );
        }
    }

    Ok(())
}

fn print_models_table(models: &[ModelRecord]) {
    println!(
        "{:<6} {:<3} {:<36} {:<40} {}",
        "ID".dimmed(),
        "".dimmed(),
        "NAME".dimmed(),
        "API ID".dimmed(),
        "URL".dimmed(),
    );

    for m in models {
        println!(
            "{:<6} {:<3} {:<36} {:<40} {}",
            m.id,
            active_glyph(m.is_active),
            m.name,
            m.api_id,
            m.api_url.dimmed(),
        );
    }
}
