//! Long-term memory commands.

use crate::bootstrap::Components;
use crate::render;
use crate::session::validate_user_id;
use clap::Args;
use ragmind_core::MemoryType;
use ragmind_memory::RecallQuery;
use std::path::Path;

/// Memory command arguments.
#[derive(Args)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub command: MemoryCommand,
}

#[derive(clap::Subcommand)]
pub enum MemoryCommand {
    /// Semantic search over a user's memories
    Search {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Search text
        #[arg(short, long)]
        query: String,

        /// Restrict to one memory type (fact, episodic, knowledge)
        #[arg(short = 't', long = "type")]
        memory_type: Option<MemoryType>,

        /// Maximum results (defaults to memory.retrieval_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum similarity (defaults to memory.score_threshold)
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Delete a user's archived conversations, keeping profile and facts
    Clear {
        /// User id
        #[arg(short, long)]
        user: String,
    },
}

/// Run the memory command.
pub async fn run(args: MemoryArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let components = Components::build(crate::load_config(config_path)?)?;
    let memory = &components.memory;

    match args.command {
        MemoryCommand::Search {
            user,
            query,
            memory_type,
            limit,
            threshold,
        } => {
            validate_user_id(&user)?;
            let mut recall = RecallQuery::new(query, &user);
            if let Some(memory_type) = memory_type {
                recall = recall.with_type(memory_type);
            }
            if let Some(limit) = limit {
                recall = recall.with_limit(limit);
            }
            if let Some(threshold) = threshold {
                recall = recall.with_threshold(threshold);
            }

            let found = memory.retrieve_relevant(&recall).await?;
            render::render_memories(&found);
        }

        MemoryCommand::Clear { user } => {
            validate_user_id(&user)?;
            memory.clear_chat_history(&user).await?;
            println!("Cleared conversation history for '{}'", user);
        }
    }

    Ok(())
}
