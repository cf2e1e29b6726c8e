//! Prompt construction for the generative strategy.
//!
//! The system instruction is fixed; the user prompt is assembled from the
//! request context plus the most recent seen texts so the model steers away
//! from near-duplicates.

use crate::context::UserContext;
use crate::corpus::Tone;

/// Recent seen texts included in the prompt as repetition guards.
pub const AVOID_RECENT_TEXTS: usize = 10;

/// Fixed system instruction sent with every generation request.
pub const QUOTE_SYSTEM_PROMPT: &str = r#"You are an expert in short quotes and sayings. Your mission is to create or adapt one short quote (two sentences at most) that answers the user's need.

IMPORTANT RULES:
- It must resonate with the emotional state and the need expressed
- No moralizing or guilt-inducing tone
- No commands ("you must", "you have to")
- When possible, credit the quote's author (or "Anonymous" for an original creation)

RESPONSE FORMAT:
Return ONLY the quote, followed by an em-dash and the author on a new line:
"[Quote]"
— [Author or Anonymous]"#;

/// Human description of a tone preference, as prompt wording.
pub fn tone_description(tone: Tone) -> &'static str {
    match tone {
        Tone::Accompanying => "gentle and supportive",
        Tone::Neutral => "neutral and simple",
        Tone::Direct => "direct and frank",
        Tone::Stoic => "stoic and composed",
        Tone::Poetic => "poetic and evocative",
    }
}

/// Build the user prompt for one generation request.
///
/// Free text takes priority; otherwise the unified question or the legacy
/// need/mood chips describe the situation. The preferred tone and the last
/// few seen quotes are appended when available.
pub fn build_user_prompt(ctx: &UserContext, seen_texts: &[String]) -> String {
    let mut prompt = String::new();

    if let Some(free) = ctx.free_text.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("The user wrote:\n\"{free}\"\n\n"));
        prompt.push_str("Find or create a short quote that would speak to them right now.");
    } else {
        let mut lines: Vec<String> = Vec::new();
        if let Some(text) = ctx.question_text.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(text.to_string());
        }
        if let Some(label) = ctx.question_label.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(format!("What I need: {label}."));
        }
        if let Some(need) = ctx.need.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(format!("I need {need}."));
        }
        if let Some(mood) = ctx.mood.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(format!("I feel {mood}."));
        }
        prompt.push_str(&format!(
            "Indications given by the user:\n{}\n",
            lines.join("\n")
        ));
    }

    if let Some(tone) = ctx.tone_pref {
        prompt.push_str(&format!("\n\nPreferred tone: {}.", tone_description(tone)));
    }

    let recent: Vec<&String> = seen_texts
        .iter()
        .rev()
        .take(AVOID_RECENT_TEXTS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if !recent.is_empty() {
        prompt.push_str("\n\nAvoid quotes similar to these (already seen):\n");
        for (i, text) in recent.iter().enumerate() {
            prompt.push_str(&format!("{}. \"{}\"\n", i + 1, text));
        }
    }

    prompt
}
