//! Shared formatting helpers for command output.

use colored::Colorize;

/// Flatten text to a single-line preview, truncated with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

pub fn active_glyph(active: bool) -> String {
    if active {
        "✓".bright_green().to_string()
    } else {
        "✗".dimmed().to_string()
    }
}
