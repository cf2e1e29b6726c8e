use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info};

use super::types::{parse_completion, ChatMessage, ChatRequest, ChatResponse, ParsedQuote};
use crate::config::{GenerativeConfig, RequestConfig};
use crate::context::UserContext;
use crate::error::{GenerativeError, GenerativeResult};
use crate::prompts::{build_user_prompt, QUOTE_SYSTEM_PROMPT};

/// A freshly generated quote, with the exact prompt that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedQuote {
    /// Parsed quote text and author.
    pub quote: ParsedQuote,
    /// The user prompt sent upstream.
    pub prompt: String,
    /// Model identity that produced the completion.
    pub model: String,
}

/// Client for the chat-completion generative service.
#[derive(Clone)]
pub struct GenerativeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    request_config: RequestConfig,
}

impl GenerativeClient {
    /// Create a new generative client. The API key may be absent; every
    /// generation attempt then fails fast with `MissingCredential`.
    pub fn new(config: &GenerativeConfig, request_config: RequestConfig) -> GenerativeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GenerativeError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
            model: config.model.clone(),
            request_config,
        })
    }

    /// The base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Masked display form of the key: a short prefix and suffix, never more.
    /// Empty string when no key is configured.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) => mask_api_key(key),
            None => String::new(),
        }
    }

    /// Generate one quote for the given context, avoiding recently seen texts.
    pub async fn generate_quote(
        &self,
        ctx: &UserContext,
        seen_texts: &[String],
    ) -> GenerativeResult<GeneratedQuote> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerativeError::MissingCredential)?;

        let prompt = build_user_prompt(ctx, seen_texts);
        let request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage::system(QUOTE_SYSTEM_PROMPT),
                ChatMessage::user(&prompt),
            ],
        );

        let url = format!("{}/v1/chat/completions", self.base_url);
        let start = Instant::now();

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling generative service");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    GenerativeError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Surface the upstream message when the body carries one.
            let message = serde_json::from_str::<serde_json::Value>(&error_body)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str().map(String::from))
                })
                .unwrap_or(error_body);
            return Err(GenerativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| GenerativeError::InvalidResponse {
                    message: format!("Failed to parse completion response: {}", e),
                })?;

        let completion = parsed
            .completion_text()
            .ok_or(GenerativeError::EmptyCompletion)?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis(),
            "Quote generated"
        );

        Ok(GeneratedQuote {
            quote: parse_completion(completion),
            prompt,
            model: self.model.clone(),
        })
    }
}

/// Mask a credential for display: first 7 and last 4 characters at most.
/// Keys too short to keep a safe margin are fully masked.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() >= 16 {
        let prefix: String = chars[..7].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{prefix}...{suffix}")
    } else {
        "*".repeat(chars.len())
    }
}
