//! `ragmind chat`: login, first-run profile setup, then the REPL.

use crate::bootstrap::Components;
use crate::repl::{Repl, ReplConfig};
use crate::session::{self, LoginFlow};
use crate::render;
use clap::Args;
use std::path::Path;

/// Chat command arguments.
#[derive(Args)]
pub struct ChatArgs {
    /// User id to log in as
    #[arg(short, long)]
    pub user: String,

    /// Create a new account for this id
    #[arg(long)]
    pub new: bool,

    /// Print answers as plain text instead of rendered markdown
    #[arg(long)]
    pub plain: bool,
}

/// Run the chat command.
pub async fn run(args: ChatArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = crate::load_config(config_path)?;
    ragmind_core::paths::ensure_dirs()?;
    let components = Components::build(config)?;
    let profiles = components.memory.profiles();

    let user_id = args.user.trim();
    match session::authenticate(profiles, user_id, args.new).await? {
        LoginFlow::SetupProfile => {
            let profile = session::prompt_profile(user_id)?;
            session::save_new_profile(profiles, &profile).await?;
            render::render_notice(format!("Profile created for '{}'.", user_id));
        }
        LoginFlow::Resume => {
            render::render_notice(format!("Welcome back, {}.", user_id));
        }
    }

    let repl_config = ReplConfig {
        markdown_output: !args.plain,
        facts_limit: components.config.memory.max_facts,
        ..ReplConfig::default()
    };
    Repl::new(&components.agent, user_id, repl_config).run().await
}
