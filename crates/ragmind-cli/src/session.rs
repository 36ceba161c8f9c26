//! Login and first-run profile setup.

use console::style;
use ragmind_core::id::{is_valid_user_id, MAX_USER_ID_LEN};
use ragmind_core::{ExplanationDepth, RiskTolerance, StylePreference, UserProfile, UserStatus};
use ragmind_memory::ProfileStore;
use std::fmt::Display;
use std::io::{self, Write};
use tracing::info;

/// Why a login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Please enter a User ID.")]
    MissingUserId,

    #[error("User ID '{0}' is invalid. Use up to {} letters, digits, '_', '-' or '.'.", MAX_USER_ID_LEN)]
    InvalidUserId(String),

    #[error("User ID '{0}' is already taken. Please choose a new ID.")]
    AlreadyTaken(String),

    #[error("Profile not found for '{0}'. Please select 'New User' to create an account.")]
    ProfileNotFound(String),
}

/// What happens after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFlow {
    /// A new account: collect preferences, then chat.
    SetupProfile,
    /// An existing account: go straight to chat.
    Resume,
}

/// Check the user id's shape before touching the store.
pub fn validate_user_id(user_id: &str) -> Result<(), LoginError> {
    if user_id.is_empty() {
        return Err(LoginError::MissingUserId);
    }
    if !is_valid_user_id(user_id) {
        return Err(LoginError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

/// Decide the login outcome from what the user claimed and what the store says.
pub fn resolve_login(user_id: &str, declared_new: bool, status: UserStatus) -> Result<LoginFlow, LoginError> {
    match (declared_new, status) {
        (true, UserStatus::New) => Ok(LoginFlow::SetupProfile),
        (true, UserStatus::Old) => Err(LoginError::AlreadyTaken(user_id.to_string())),
        (false, UserStatus::Old) => Ok(LoginFlow::Resume),
        (false, UserStatus::New) => Err(LoginError::ProfileNotFound(user_id.to_string())),
    }
}

/// Validate the id and look up its status.
pub async fn authenticate(store: &ProfileStore, user_id: &str, declared_new: bool) -> Result<LoginFlow, LoginError> {
    validate_user_id(user_id)?;
    let status = store.check_user_status(user_id).await;
    let flow = resolve_login(user_id, declared_new, status)?;
    info!("Login for {} resolved to {:?}", user_id, flow);
    Ok(flow)
}

/// Interactively collect preferences for a new user.
pub fn prompt_profile(user_id: &str) -> anyhow::Result<UserProfile> {
    eprintln!();
    eprintln!("{}", style("Tell us how you like your answers.").bold());
    eprintln!();

    let risk = choose("Risk tolerance", RiskTolerance::ALL, RiskTolerance::default())?;
    let depth = choose("Explanation depth", ExplanationDepth::ALL, ExplanationDepth::default())?;
    let style_pref = choose("Response style", StylePreference::ALL, StylePreference::default())?;

    Ok(UserProfile::new(user_id)
        .with_risk_tolerance(risk)
        .with_explanation_depth(depth)
        .with_style_preference(style_pref))
}

/// Persist a freshly created profile, wrapping the failure the way the user sees it.
pub async fn save_new_profile(store: &ProfileStore, profile: &UserProfile) -> anyhow::Result<()> {
    store
        .update_profile(profile)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to save profile: {}", e))
}

fn choose<T: Copy + PartialEq + Display>(label: &str, options: &[T], default: T) -> anyhow::Result<T> {
    eprintln!("{}", style(label).bold());
    let default_idx = options.iter().position(|o| *o == default).unwrap_or(0);
    let idx = prompt_select(options, default_idx)?;
    Ok(options[idx])
}

/// Read one trimmed line from stdin after printing `prompt` to stderr.
pub fn prompt_input(prompt: &str) -> anyhow::Result<String> {
    eprint!("  {}", prompt);
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt for a yes/no question with a default.
pub fn prompt_yes_no(prompt: &str, default_yes: bool) -> anyhow::Result<bool> {
    let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
    let answer = prompt_input(&format!("{} {}: ", prompt, suffix))?;
    Ok(parse_yes_no(&answer, default_yes))
}

/// Prompt user to select from a numbered list. Returns the zero-based index.
pub fn prompt_select<T: Display>(items: &[T], default_idx: usize) -> anyhow::Result<usize> {
    for (i, item) in items.iter().enumerate() {
        let marker = if i == default_idx { " (default)" } else { "" };
        eprintln!("  {} {}{}", style(format!("[{}]", i + 1)).cyan(), item, style(marker).dim());
    }

    let choice = prompt_input(&format!("Select [{}]: ", default_idx + 1))?;
    eprintln!();
    Ok(parse_selection(&choice, items.len(), default_idx))
}

fn parse_yes_no(answer: &str, default_yes: bool) -> bool {
    if answer.is_empty() {
        default_yes
    } else {
        answer.to_lowercase().starts_with('y')
    }
}

/// Map a typed 1-based number to an index. Anything else keeps the default.
fn parse_selection(choice: &str, len: usize, default_idx: usize) -> usize {
    match choice.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => n - 1,
        _ => default_idx,
    }
}
