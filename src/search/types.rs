use serde::{Deserialize, Serialize};

use crate::corpus::{QuoteLength, Tone};

/// Request body for `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Free-form semantic query.
    pub query: String,
    /// Number of hits requested.
    pub top_k: u32,
    /// Quote ids the service should not return (already seen).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_ids: Vec<String>,
}

impl SearchRequest {
    /// Create a request for `top_k` hits.
    pub fn new(query: impl Into<String>, top_k: u32) -> Self {
        Self {
            query: query.into(),
            top_k,
            exclude_ids: Vec::new(),
        }
    }

    /// Exclude already-seen quote ids from the results.
    pub fn with_exclude_ids(mut self, ids: Vec<String>) -> Self {
        self.exclude_ids = ids;
        self
    }
}

/// Response body for `POST /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Ranked hits, best first.
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Corpus id of the matched quote.
    pub id: String,
    /// Quote text.
    pub text: String,
    /// Relevance score reported by the service.
    pub score: f64,
    /// Categorical metadata, all fields optional on the wire.
    #[serde(default)]
    pub metadata: HitMetadata,
}

/// Optional quote metadata attached to a search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<QuoteLength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub is_injunctive: Option<bool>,
    #[serde(default)]
    pub is_guilt_inducing: Option<bool>,
    #[serde(default)]
    pub is_toxic_positive: Option<bool>,
}
