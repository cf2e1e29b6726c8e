use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Author credited when the completion carries no recognizable attribution.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Chat message role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Create a request with the strategy's fixed sampling settings.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.8,
            max_tokens: 200,
        }
    }
}

/// Response body for the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

/// Message payload of a completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// The trimmed text of the first choice, if any.
    pub fn completion_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A generated quote split into display text and author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    /// The quote text, stripped of wrapping quotation marks.
    pub text: String,
    /// The credited author; [`ANONYMOUS_AUTHOR`] when none was recognized.
    pub author: String,
}

fn quoted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)^"(.+?)"\s*—\s*(.+)$"#).expect("valid regex"))
}

fn dashed_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^(.+?)\s*—\s*(.+)$").expect("valid regex"))
}

/// Split a raw completion into quote text and author.
///
/// Best-effort heuristic, not a contract: upstream phrasing is not under our
/// control. Tries the `"quote" — author` shape, then any `text — author`
/// split, then a trailing dash-prefixed author line; otherwise the whole
/// completion is the text and the author is [`ANONYMOUS_AUTHOR`].
pub fn parse_completion(completion: &str) -> ParsedQuote {
    let raw = completion.trim();

    if let Some(caps) = quoted_pattern().captures(raw).or_else(|| dashed_pattern().captures(raw)) {
        return ParsedQuote {
            text: strip_quotes(caps[1].trim()),
            author: caps[2].trim().to_string(),
        };
    }

    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() >= 2 {
        let last = lines[lines.len() - 1].trim();
        if let Some(author) = last.strip_prefix('—').or_else(|| last.strip_prefix('-')) {
            let text = lines[..lines.len() - 1].join("\n");
            return ParsedQuote {
                text: strip_quotes(text.trim()),
                author: author.trim().to_string(),
            };
        }
    }

    ParsedQuote {
        text: strip_quotes(raw),
        author: ANONYMOUS_AUTHOR.to_string(),
    }
}

fn strip_quotes(text: &str) -> String {
    text.trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_with_em_dash() {
        let parsed = parse_completion("\"The wound is where the light enters.\" — Rumi");
        assert_eq!(parsed.text, "The wound is where the light enters.");
        assert_eq!(parsed.author, "Rumi");
    }

    #[test]
    fn test_parse_quote_and_author_on_separate_lines() {
        let parsed = parse_completion("\"One step is still a journey.\"\n— Anonymous");
        assert_eq!(parsed.text, "One step is still a journey.");
        assert_eq!(parsed.author, "Anonymous");
    }

    #[test]
    fn test_parse_unquoted_with_em_dash() {
        let parsed = parse_completion("Fall seven times, stand up eight. — Japanese proverb");
        assert_eq!(parsed.text, "Fall seven times, stand up eight.");
        assert_eq!(parsed.author, "Japanese proverb");
    }

    #[test]
    fn test_parse_dash_prefixed_last_line() {
        let parsed = parse_completion("Rest is not idleness.\nIt is repair.\n- John Lubbock");
        assert_eq!(parsed.text, "Rest is not idleness.\nIt is repair.");
        assert_eq!(parsed.author, "John Lubbock");
    }

    #[test]
    fn test_parse_no_attribution_falls_back_to_anonymous() {
        let parsed = parse_completion("\"Keep going, gently.\"");
        assert_eq!(parsed.text, "Keep going, gently.");
        assert_eq!(parsed.author, ANONYMOUS_AUTHOR);
    }

    #[test]
    fn test_completion_text_extraction() {
        let raw = r#"{"choices": [{"message": {"content": "  hello  "}}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.completion_text(), Some("hello"));

        let raw = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.completion_text(), None);

        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.completion_text(), None);
    }

    #[test]
    fn test_chat_request_defaults() {
        let req = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("hi")]);
        assert!((req.temperature - 0.8).abs() < 1e-9);
        assert_eq!(req.max_tokens, 200);
    }
}
