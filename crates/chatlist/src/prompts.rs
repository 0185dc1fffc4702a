use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use chatlist_store::{Database, PromptFilter, PromptRecord, PromptResult};

use crate::output::preview;

#[derive(Subcommand, Debug)]
pub enum PromptAction {
    /// Add a new prompt
    Add {
        /// Prompt text
        text: String,

        /// Author to record (default: chatlist.toml, then the default_author setting)
        #[arg(long)]
        author: Option<String>,
    },

    /// List prompts, newest first
    List {
        /// Substring to search for in prompt text
        #[arg(long)]
        search: Option<String>,

        /// Show prompts after this date (YYYY-MM-DD)
        #[arg(long)]
        after: Option<String>,

        /// Show prompts before this date (YYYY-MM-DD)
        #[arg(long)]
        before: Option<String>,

        /// Maximum number of prompts to show
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a prompt together with all its results
    Show {
        /// Prompt ID
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a prompt and all its results
    Delete {
        /// Prompt ID
        id: i64,
    },
}

pub fn handle_prompt_command(
    db: &Database,
    action: PromptAction,
    default_author: Option<&str>,
) -> Result<()> {
    match action {
        PromptAction::Add { text, author } => {
            let author = author.as_deref().or(default_author);
            let prompt = db.prompts().add(&text, author)?;
            println!(
                "{} Added prompt #{} by {}",
                "✓".bright_green(),
                prompt.id,
                prompt.author
            );
        }
        PromptAction::List {
            search,
            after,
            before,
            limit,
            json,
        } => {
            let filter = build_filter(search, after, before, limit)?;
            let prompts = db.prompts().list(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&prompts)?);
            } else if prompts.is_empty() {
                println!("{}", "No prompts found.".dimmed());
            } else {
                print_prompts_table(&prompts);
            }
        }
        PromptAction::Show { id, json } => {
            let prompt = db
                .prompts()
                .get(id)?
                .ok_or_else(|| anyhow::anyhow!("prompt {} not found", id))?;
            let results = db.results().for_prompt(id)?;

            if json {
                let detail = serde_json::json!({ "prompt": prompt, "results": results });
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_prompt_detail(&prompt, &results);
            }
        }
        PromptAction::Delete { id } => {
            db.prompts().delete(id)?;
            println!(
                "{} Deleted prompt #{} and its results",
                "✓".bright_green(),
                id
            );
        }
    }

    Ok(())
}

fn build_filter(
    search: Option<String>,
    after: Option<String>,
    before: Option<String>,
    limit: Option<usize>,
) -> Result<PromptFilter> {
    use chrono::{NaiveDate, TimeZone, Utc};

    let after = after
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap()))
                .map_err(|e| anyhow::anyhow!("Invalid --after date: {}", e))
        })
        .transpose()?;

    let before = before
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(23, 59, 59).unwrap()))
                .map_err(|e| anyhow::anyhow!("Invalid --before date: {}", e))
        })
        .transpose()?;

    Ok(PromptFilter {
        search,
        after,
        before,
        limit,
    })
}

fn print_prompts_table(prompts: &[PromptRecord]) {
    println!(
        "{:<6} {:<17} {:<12} {}",
        "ID".dimmed(),
        "CREATED".dimmed(),
        "AUTHOR".dimmed(),
        "TEXT".dimmed(),
    );

    for p in prompts {
        let ts = p.created_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<6} {:<17} {:<12} {}",
            p.id,
            ts,
            p.author,
            preview(&p.text, 60)
        );
    }
}

fn print_prompt_detail(prompt: &PromptRecord, results: &[PromptResult]) {
    println!("{}", "=== Prompt ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), prompt.id);
    println!("{}  {}", "Author:".dimmed(), prompt.author);
    println!(
        "{}  {}",
        "Created:".dimmed(),
        prompt.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    println!("  {}", prompt.text);
    println!();

    if results.is_empty() {
        println!("{}", "No results recorded yet.".dimmed());
        return;
    }

    for r in results {
        let marker = if r.result.is_selected {
            "★".bright_yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {} #{} {}  {}",
            marker,
            r.model_name.bright_cyan(),
            r.result.id,
            r.result
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed(),
            preview(&r.result.response_text, 70)
        );
    }
}
