use std::io::Read;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use chatlist_store::{Database, SelectedResult};

use crate::output::preview;

#[derive(Subcommand, Debug)]
pub enum ResultAction {
    /// Record a model's response to a prompt
    Add {
        /// Prompt ID
        prompt_id: i64,

        /// Model ID
        model_id: i64,

        /// Response text (reads stdin when omitted, so the API-calling
        /// layer can pipe responses in)
        #[arg(long)]
        text: Option<String>,
    },

    /// Mark results as selected (favorites)
    Select {
        /// Result IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Clear the selected flag on results
    Unselect {
        /// Result IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete a single result
    Delete {
        /// Result ID
        id: i64,
    },
}

pub fn handle_result_command(db: &Database, action: ResultAction) -> Result<()> {
    match action {
        ResultAction::Add {
            prompt_id,
            model_id,
            text,
        } => {
            let text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read response text from stdin")?;
                    buf.trim_end().to_string()
                }
            };

            let result = db.results().add(prompt_id, model_id, &text)?;
            println!(
                "{} Recorded result #{} for prompt #{}",
                "✓".bright_green(),
                result.id,
                prompt_id
            );
        }
        ResultAction::Select { ids } => {
            let changed = db.results().set_selected(&ids, true)?;
            report_selection(changed, ids.len(), "selected");
        }
        ResultAction::Unselect { ids } => {
            let changed = db.results().set_selected(&ids, false)?;
            report_selection(changed, ids.len(), "unselected");
        }
        ResultAction::Delete { id } => {
            db.results().delete(id)?;
            println!("{} Deleted result #{}", "✓".bright_green(), id);
        }
    }

    Ok(())
}

pub fn handle_selected_command(db: &Database, json: bool) -> Result<()> {
    let selected = db.results().list_selected()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else if selected.is_empty() {
        println!("{}", "No selected results.".dimmed());
    } else {
        print_selected_table(&selected);
    }

    Ok(())
}

fn report_selection(changed: usize, requested: usize, verb: &str) {
    if changed == requested {
        println!("{} {} {} result(s)", "✓".bright_green(), verb, changed);
    } else {
        println!(
            "{} {} {} of {} result(s); unknown ids skipped",
            "⚠".bright_yellow(),
            verb,
            changed,
            requested
        );
    }
}

fn print_selected_table(selected: &[SelectedResult]) {
    println!(
        "{:<6} {:<17} {:<24} {:<34} {}",
        "ID".dimmed(),
        "CREATED".dimmed(),
        "MODEL".dimmed(),
        "PROMPT".dimmed(),
        "RESPONSE".dimmed(),
    );

    for s in selected {
        let ts = s.result.created_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<6} {:<17} {:<24} {:<34} {}",
            s.result.id,
            ts,
            s.model_name.bright_cyan(),
            preview(&s.prompt_text, 30),
            preview(&s.result.response_text, 50),
        );
    }
}
