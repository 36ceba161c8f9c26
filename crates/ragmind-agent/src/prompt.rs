//! System prompt assembly.

use ragmind_core::{ExplanationDepth, RiskTolerance, ScoredMemory, StylePreference, UserProfile};
use std::fmt::Write;

fn risk_guidance(risk: RiskTolerance) -> &'static str {
    match risk {
        RiskTolerance::Low => "Favour safe, conservative options and call out downsides clearly.",
        RiskTolerance::Medium => "Balance upside against risk and mention the main trade-offs.",
        RiskTolerance::High => "The user is comfortable with bold options; do not over-hedge.",
    }
}

fn depth_guidance(depth: ExplanationDepth) -> &'static str {
    match depth {
        ExplanationDepth::Simple => "Explain in plain language without jargon.",
        ExplanationDepth::Detailed => "Give complete explanations with the key reasoning steps.",
        ExplanationDepth::Technical => "Use precise technical language and include specifics.",
    }
}

fn style_guidance(style: StylePreference) -> &'static str {
    match style {
        StylePreference::Formal => "Keep a professional, formal tone.",
        StylePreference::Casual => "Keep a relaxed, conversational tone.",
        StylePreference::Concise => "Be brief. Lead with the answer and skip filler.",
    }
}

/// Everything the agent knows about the user for one turn.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub profile: &'a UserProfile,
    pub facts: &'a [ScoredMemory],
    pub episodes: &'a [ScoredMemory],
    pub recent: &'a str,
}

/// Build the system prompt for a turn.
///
/// Empty sections are omitted.
pub fn build_system_prompt(ctx: &PromptContext<'_>) -> String {
    let profile = ctx.profile;
    let mut prompt = String::from(
        "You are a helpful assistant with long-term memory of this user. \
         Use what you remember when it is relevant and never invent memories.\n",
    );

    let _ = write!(
        prompt,
        "\n## User preferences\n- risk tolerance: {} ({})\n- explanation depth: {} ({})\n- style: {} ({})\n",
        profile.risk_tolerance,
        risk_guidance(profile.risk_tolerance),
        profile.explanation_depth,
        depth_guidance(profile.explanation_depth),
        profile.style_preference,
        style_guidance(profile.style_preference),
    );

    if !ctx.facts.is_empty() {
        prompt.push_str("\n## Known facts about the user\n");
        for fact in ctx.facts {
            let _ = writeln!(prompt, "- {}", fact.item.content);
        }
    }

    if !ctx.episodes.is_empty() {
        prompt.push_str("\n## Related past conversations\n");
        for episode in ctx.episodes {
            let _ = writeln!(prompt, "{}\n", episode.item.content);
        }
    }

    if !ctx.recent.is_empty() {
        let _ = write!(prompt, "\n## Recent conversation\n{}\n", ctx.recent);
    }

    prompt
}
