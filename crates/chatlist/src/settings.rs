use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use chatlist_store::Database;

#[derive(Subcommand, Debug)]
pub enum SettingAction {
    /// Print a setting value
    Get {
        /// Setting key
        key: String,
    },

    /// Set a setting value (insert or overwrite)
    Set {
        /// Setting key
        key: String,

        /// Setting value
        value: String,
    },

    /// Remove a setting
    Unset {
        /// Setting key
        key: String,
    },

    /// Show the well-known application settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_setting_command(db: &Database, action: SettingAction) -> Result<()> {
    match action {
        SettingAction::Get { key } => match db.settings().get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("{}", "(not set)".dimmed()),
        },
        SettingAction::Set { key, value } => {
            db.settings().set(&key, &value)?;
            println!("{} {} = {}", "✓".bright_green(), key, value);
        }
        SettingAction::Unset { key } => {
            if db.settings().remove(&key)? {
                println!("{} Removed '{}'", "✓".bright_green(), key);
            } else {
                println!("{}", format!("'{}' was not set", key).dimmed());
            }
        }
        SettingAction::Show { json } => {
            let app = db.settings().load_app()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&app)?);
            } else {
                println!("{}  {}", "Theme:".dimmed(), app.theme);
                println!("{}  {}", "Default author:".dimmed(), app.default_author);
                println!(
                    "{}  {}s",
                    "Request timeout:".dimmed(),
                    app.request_timeout_secs
                );
            }
        }
    }

    Ok(())
}
