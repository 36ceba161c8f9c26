//! Terminal rendering utilities.
//!
//! Markdown answers, profile and memory listings, and REPL banners.

use console::style;
use ragmind_core::{ScoredMemory, UserProfile};

/// Render markdown text to the terminal.
pub fn render_markdown(text: &str) {
    let skin = termimad::MadSkin::default();
    skin.print_text(text);
}

/// Print the welcome banner for the REPL.
pub fn render_welcome(user_id: &str, model: &str) {
    eprintln!(
        "{} {} {}",
        style("ragmind").bold().cyan(),
        style(format!("logged in as {}", user_id)).dim(),
        style(format!("({})", model)).dim(),
    );
    eprintln!("{}", style("Type /help for commands, /quit to exit.").dim());
    eprintln!();
}

/// Print the help message.
pub fn render_help() {
    eprintln!("{}", style("Available commands:").bold());
    eprintln!("  {}    - Show this help", style("/help").cyan());
    eprintln!("  {} - Show your stored preferences", style("/profile").cyan());
    eprintln!("  {}   - List what is remembered about you", style("/facts").cyan());
    eprintln!("  {}   - Forget past conversations, keep profile and facts", style("/clear").cyan());
    eprintln!("  {}   - Delete your profile and all memories, then exit", style("/reset").cyan());
    eprintln!("  {}    - Save what was learned and exit", style("/quit").cyan());
    eprintln!();
}

/// Print a profile as aligned key/value lines.
pub fn render_profile(profile: &UserProfile) {
    eprintln!("{} {}", style("Profile").bold(), style(&profile.user_id).cyan());
    eprintln!("  {:<18} {}", style("risk tolerance").dim(), profile.risk_tolerance);
    eprintln!("  {:<18} {}", style("explanation depth").dim(), profile.explanation_depth);
    eprintln!("  {:<18} {}", style("style").dim(), profile.style_preference);
}

/// Print retrieved memories with their similarity scores.
pub fn render_memories(memories: &[ScoredMemory]) {
    if memories.is_empty() {
        eprintln!("{}", style("Nothing remembered yet.").dim());
        return;
    }

    for memory in memories {
        eprintln!(
            "  {} {} {}",
            style(format!("{:.2}", memory.score)).cyan(),
            style(format!("[{}]", memory.item.memory_type)).dim(),
            memory.item.content.replace('\n', " | "),
        );
    }
}

/// Print an error line.
pub fn render_error(message: impl std::fmt::Display) {
    eprintln!("{}: {}", style("Error").red(), message);
}

/// Print a dimmed status line.
pub fn render_notice(message: impl std::fmt::Display) {
    eprintln!("{}", style(message.to_string()).dim());
}
