//! Interactive read-eval-print loop.
//!
//! Provides `ragmind chat`: rustyline line editing, a progress spinner while
//! the agent answers, and markdown rendering. The session transcript is
//! consolidated into long-term facts when the user quits.

use crate::render;
use indicatif::{ProgressBar, ProgressStyle};
use ragmind_agent::ChatAgent;
use ragmind_core::MemoryType;
use ragmind_memory::RecallQuery;
use rustyline::error::ReadlineError;
use rustyline::highlight::MatchingBracketHighlighter;
use rustyline::hint::HistoryHinter;
use rustyline::{CompletionType, Config, EditMode, Editor};
use rustyline_derive::{Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Slash commands offered for completion.
const COMMANDS: &[&str] = &["/help", "/profile", "/facts", "/clear", "/reset", "/quit", "/exit"];

/// Query used to list a user's facts.
const FACTS_QUERY: &str = "general user facts";

/// REPL configuration.
pub struct ReplConfig {
    /// Path to history file.
    pub history_file: PathBuf,
    /// Show markdown rendering.
    pub markdown_output: bool,
    /// Facts listed by `/facts`.
    pub facts_limit: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        let history_file = ragmind_core::paths::history_file()
            .unwrap_or_else(|_| PathBuf::from(".ragmind_history"));

        Self {
            history_file,
            markdown_output: true,
            facts_limit: 25,
        }
    }
}

/// Tab-completion helper for slash commands.
#[derive(Helper, Highlighter, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Highlighter)]
    highlighter: MatchingBracketHighlighter,
    #[rustyline(Validator)]
    validator: rustyline::validate::MatchingBracketValidator,
}

impl rustyline::completion::Completer for ReplHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.starts_with('/') {
            Ok((0, complete_command(&line[..pos])))
        } else {
            Ok((pos, Vec::new()))
        }
    }
}

fn complete_command(prefix: &str) -> Vec<String> {
    COMMANDS
        .iter()
        .filter(|c| c.starts_with(prefix))
        .map(|c| c.to_string())
        .collect()
}

/// A parsed slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlashCommand {
    Help,
    Profile,
    Facts,
    Clear,
    Reset,
    Quit,
    Unknown,
}

impl SlashCommand {
    fn parse(input: &str) -> Self {
        match input.split_whitespace().next().unwrap_or("") {
            "/help" => Self::Help,
            "/profile" => Self::Profile,
            "/facts" => Self::Facts,
            "/clear" => Self::Clear,
            "/reset" => Self::Reset,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// How the loop should proceed after a command.
enum CommandResult {
    Continue,
    /// Leave and consolidate the transcript.
    Quit,
    /// Leave without consolidating; the user's memory is gone.
    Exit,
}

/// The interactive REPL for one logged-in user.
pub struct Repl<'a> {
    agent: &'a ChatAgent,
    user_id: String,
    config: ReplConfig,
    transcript: Vec<String>,
}

impl<'a> Repl<'a> {
    /// Create a new REPL instance.
    pub fn new(agent: &'a ChatAgent, user_id: impl Into<String>, config: ReplConfig) -> Self {
        Self {
            agent,
            user_id: user_id.into(),
            config,
            transcript: Vec::new(),
        }
    }

    /// Run the REPL loop.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        render::render_welcome(&self.user_id, &self.agent.config().model);

        let rl_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let helper = ReplHelper {
            hinter: HistoryHinter::new(),
            highlighter: MatchingBracketHighlighter::new(),
            validator: rustyline::validate::MatchingBracketValidator::new(),
        };

        let mut rl: Editor<ReplHelper, rustyline::history::FileHistory> = Editor::with_config(rl_config)?;
        rl.set_helper(Some(helper));

        let _ = rl.load_history(&self.config.history_file);

        let mut consolidate = true;
        loop {
            let prompt = console::style("> ").green().bold().to_string();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(trimmed);

                    if trimmed.starts_with('/') {
                        match self.handle_command(trimmed).await {
                            CommandResult::Continue => {}
                            CommandResult::Quit => break,
                            CommandResult::Exit => {
                                consolidate = false;
                                break;
                            }
                        }
                        continue;
                    }

                    self.send_message(trimmed).await;
                }
                Err(ReadlineError::Interrupted) => {
                    eprintln!("{}", console::style("^C (type /quit to exit)").dim());
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    render::render_error(err);
                    break;
                }
            }
        }

        let _ = rl.save_history(&self.config.history_file);

        if consolidate {
            self.consolidate().await;
        }

        eprintln!("{}", console::style("Goodbye!").dim());
        Ok(())
    }

    async fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let memory = self.agent.memory();
        match SlashCommand::parse(cmd) {
            SlashCommand::Help => render::render_help(),
            SlashCommand::Profile => {
                let profile = memory.get_profile(&self.user_id).await;
                render::render_profile(&profile);
            }
            SlashCommand::Facts => {
                let recall = RecallQuery::new(FACTS_QUERY, &self.user_id)
                    .with_type(MemoryType::Fact)
                    .with_limit(self.config.facts_limit)
                    .with_threshold(0.0);
                match memory.retrieve_relevant(&recall).await {
                    Ok(facts) => render::render_memories(&facts),
                    Err(e) => render::render_error(e),
                }
            }
            SlashCommand::Clear => match memory.clear_chat_history(&self.user_id).await {
                Ok(()) => {
                    self.transcript.clear();
                    render::render_notice("Chat history cleared. Profile and facts were kept.");
                }
                Err(e) => render::render_error(e),
            },
            SlashCommand::Reset => {
                return match memory.reset_memory(&self.user_id).await {
                    Ok(()) => {
                        render::render_notice(format!("All data for '{}' was deleted.", self.user_id));
                        CommandResult::Exit
                    }
                    Err(e) => {
                        warn!("Reset for {} incomplete: {}", self.user_id, e);
                        render::render_error("Could not delete all data.");
                        CommandResult::Exit
                    }
                };
            }
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Unknown => {
                render::render_error(format!("Unknown command {}", cmd));
                render::render_help();
            }
        }
        CommandResult::Continue
    }

    async fn send_message(&mut self, message: &str) {
        let spinner = spinner("Thinking...");
        let result = self.agent.generate_response(&self.user_id, message).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => {
                self.transcript.push(format!("User: {}", message));
                self.transcript.push(format!("Agent: {}", reply.content));

                eprintln!();
                if self.config.markdown_output {
                    render::render_markdown(&reply.content);
                } else {
                    println!("{}", reply.content);
                }
                if reply.from_cache {
                    render::render_notice("(answered from cache)");
                }
                if !reply.interaction.is_clean() {
                    render::render_notice("(some memory updates could not be saved)");
                }
                eprintln!();
            }
            Err(e) => render::render_error(e),
        }
    }

    async fn consolidate(&self) {
        if self.transcript.is_empty() {
            return;
        }

        let spinner = spinner("Saving what I learned...");
        let result = self
            .agent
            .memory()
            .consolidate_session(&self.user_id, &self.transcript)
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(0) => {}
            Ok(n) => render::render_notice(format!("{} facts remembered.", n)),
            Err(e) => {
                warn!("Consolidation for {} failed: {}", self.user_id, e);
                render::render_error(format!("Could not save session facts: {}", e));
            }
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
