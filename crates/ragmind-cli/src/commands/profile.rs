//! Profile inspection and deletion.

use crate::bootstrap::Components;
use crate::render;
use crate::session::{prompt_yes_no, validate_user_id};
use clap::Args;
use ragmind_core::UserStatus;
use std::path::Path;

/// Profile command arguments.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(clap::Subcommand)]
pub enum ProfileCommand {
    /// Show a user's stored preferences
    Show {
        /// User id
        #[arg(short, long)]
        user: String,
    },

    /// Delete a user's profile and every memory stored for them
    Delete {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run the profile command.
pub async fn run(args: ProfileArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let components = Components::build(crate::load_config(config_path)?)?;
    let memory = &components.memory;

    match args.command {
        ProfileCommand::Show { user } => {
            validate_user_id(&user)?;
            match memory.profiles().try_get_profile(&user).await? {
                Some(profile) => render::render_profile(&profile),
                None => anyhow::bail!("No profile stored for '{}'", user),
            }
        }

        ProfileCommand::Delete { user, yes } => {
            validate_user_id(&user)?;
            if memory.profiles().check_user_status(&user).await == UserStatus::New {
                render::render_notice(format!("No profile stored for '{}'; clearing memories anyway.", user));
            }
            if !yes && !prompt_yes_no(&format!("Delete all data for '{}'?", user), false)? {
                render::render_notice("Aborted.");
                return Ok(());
            }

            memory
                .reset_memory(&user)
                .await
                .map_err(|e| anyhow::anyhow!("Could not delete all data: {}", e))?;
            println!("Deleted profile and memories for '{}'", user);
        }
    }

    Ok(())
}
