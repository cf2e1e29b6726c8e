use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info, warn};

use super::types::{SearchRequest, SearchResponse};
use crate::config::{RequestConfig, SearchConfig};
use crate::context::UserContext;
use crate::error::{SearchClientResult, SearchError};

/// Client for the semantic search service.
#[derive(Clone)]
pub struct SemanticSearchClient {
    client: Client,
    base_url: String,
    request_config: RequestConfig,
}

impl SemanticSearchClient {
    /// Create a new search client.
    pub fn new(config: &SearchConfig, request_config: RequestConfig) -> SearchClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(SearchError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_config,
        })
    }

    /// The base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Boolean reachability probe against `GET /health`. The body is ignored;
    /// only a success status counts as healthy.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Search health probe failed");
                false
            }
        }
    }

    /// Run one semantic search round trip.
    pub async fn search(&self, request: SearchRequest) -> SearchClientResult<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let start = Instant::now();

        debug!(
            query_len = request.query.len(),
            top_k = request.top_k,
            excluded = request.exclude_ids.len(),
            "Calling semantic search"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else if e.is_connect() {
                    SearchError::Unreachable {
                        message: e.to_string(),
                    }
                } else {
                    SearchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Prefer the upstream-provided message when the body carries one.
            let message = serde_json::from_str::<serde_json::Value>(&error_body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str().map(String::from)))
                .unwrap_or(error_body);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::InvalidResponse {
                    message: format!("Failed to parse search response: {}", e),
                })?;

        info!(
            hits = parsed.results.len(),
            latency_ms = start.elapsed().as_millis(),
            "Semantic search completed"
        );

        Ok(parsed)
    }
}

/// Build the semantic query string for a request context.
///
/// Lines, in order: the unified question text, the question label phrased as
/// a need, need/mood lines from the legacy chips, and the free text last.
/// Free text is always appended when present, never dropped.
pub fn build_search_query(ctx: &UserContext) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(text) = trimmed(&ctx.question_text) {
        lines.push(text.to_string());
    }
    if let Some(label) = trimmed(&ctx.question_label) {
        lines.push(format!("What I need: {label}."));
    }
    if let Some(need) = trimmed(&ctx.need) {
        lines.push(format!("I need {need}."));
    }
    if let Some(mood) = trimmed(&ctx.mood) {
        lines.push(format!("I feel {mood}."));
    }
    if let Some(free) = trimmed(&ctx.free_text) {
        lines.push(free.to_string());
    }

    lines.join("\n")
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    #[test]
    fn test_client_creation() {
        let config = SearchConfig {
            base_url: "http://localhost:5001".to_string(),
        };
        let client = SemanticSearchClient::new(&config, RequestConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_query_from_unified_question() {
        let ctx = UserContext::new().with_question("Calm", "What would help right now?");
        let query = build_search_query(&ctx);
        assert_eq!(query, "What would help right now?\nWhat I need: Calm.");
    }

    #[test]
    fn test_query_appends_free_text_last() {
        let ctx = UserContext::new()
            .with_need("calm")
            .with_mood("stressed")
            .with_free_text("big exam tomorrow");
        let query = build_search_query(&ctx);
        assert_eq!(query, "I need calm.\nI feel stressed.\nbig exam tomorrow");
    }

    #[test]
    fn test_query_skips_blank_fields() {
        let mut ctx = UserContext::new().with_free_text("  just this  ");
        ctx.question_label = Some("   ".to_string());
        assert_eq!(build_search_query(&ctx), "just this");
    }

    #[test]
    fn test_empty_context_empty_query() {
        assert_eq!(build_search_query(&UserContext::new()), "");
    }
}
