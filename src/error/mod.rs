use thiserror::Error;

/// Top-level errors surfaced by the recommendation orchestrator.
///
/// Every variant is terminal for the current request: the only internal
/// retry in the whole pipeline is the seen-pool exhaustion reset inside the
/// rules engine, which is a designed self-healing step, not an error.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Corpus unavailable: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Generative error: {0}")]
    Generative(#[from] GenerativeError),

    #[error("No result: {message}")]
    EmptyResult { message: String },

    #[error("Unknown quote: {quote_id}")]
    UnknownQuote { quote_id: String },
}

/// Corpus loading errors. Any of these puts the rules strategy into a
/// permanent unavailable state until the corpus is reloaded.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus is not loaded")]
    Unavailable,

    #[error("failed to read corpus file: {message}")]
    Io { message: String },

    #[error("malformed corpus document: {message}")]
    Parse { message: String },

    #[error("corpus document contains no quotes")]
    Empty,
}

/// History storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Corrupt history value: {message}")]
    Corrupt { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Semantic search service errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search service unreachable: {message}")]
    Unreachable { message: String },

    #[error("search API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid search response: {message}")]
    InvalidResponse { message: String },

    #[error("search request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Generative service errors.
#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("no API key configured for the generative service")]
    MissingCredential,

    #[error("generative API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid generative response: {message}")]
    InvalidResponse { message: String },

    #[error("generative service returned an empty completion")]
    EmptyCompletion,

    #[error("generative request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RecommendError {
    /// A user-facing explanation with actionable guidance.
    ///
    /// The orchestrator never shows partial results: a request either fully
    /// succeeds or fails with exactly one of these messages.
    pub fn user_message(&self) -> String {
        match self {
            RecommendError::Config { message } => {
                format!("Configuration problem: {message}. Check your environment settings.")
            }
            RecommendError::Corpus(_) => {
                "The quote corpus could not be loaded. Check the corpus file and reload."
                    .to_string()
            }
            RecommendError::Storage(_) => {
                "Your history could not be read or saved. Try again.".to_string()
            }
            RecommendError::Search(SearchError::Unreachable { .. }) => {
                "The semantic search service is not reachable. Start it and try again."
                    .to_string()
            }
            RecommendError::Search(_) => {
                "The semantic search service failed. Try again in a moment.".to_string()
            }
            RecommendError::Generative(GenerativeError::MissingCredential) => {
                "No API key is configured for the generative service. Add one in the settings."
                    .to_string()
            }
            RecommendError::Generative(_) => {
                "The generative service failed. Try again in a moment.".to_string()
            }
            RecommendError::EmptyResult { message } => {
                format!("{message} Try different options.")
            }
            RecommendError::UnknownQuote { quote_id } => {
                format!("Quote '{quote_id}' is not part of the corpus.")
            }
        }
    }
}

/// Result type alias for recommendation operations
pub type RecommendResult<T> = Result<T, RecommendError>;

/// Result type alias for corpus loading
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for search client operations
pub type SearchClientResult<T> = Result<T, SearchError>;

/// Result type alias for generative client operations
pub type GenerativeResult<T> = Result<T, GenerativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_error_display() {
        let err = RecommendError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = RecommendError::EmptyResult {
            message: "No quote matched.".to_string(),
        };
        assert_eq!(err.to_string(), "No result: No quote matched.");
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::Unreachable {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "search service unreachable: connection refused"
        );

        let err = SearchError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "search API error: 500 - internal");

        let err = SearchError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "search request timeout after 5000ms");
    }

    #[test]
    fn test_generative_error_display() {
        assert_eq!(
            GenerativeError::MissingCredential.to_string(),
            "no API key configured for the generative service"
        );
        assert_eq!(
            GenerativeError::EmptyCompletion.to_string(),
            "generative service returned an empty completion"
        );
    }

    #[test]
    fn test_corpus_error_conversion() {
        let err: RecommendError = CorpusError::Empty.into();
        assert!(matches!(err, RecommendError::Corpus(_)));
        assert!(err.to_string().contains("no quotes"));
    }

    #[test]
    fn test_user_message_missing_credential() {
        let err: RecommendError = GenerativeError::MissingCredential.into();
        assert!(err.user_message().contains("API key"));
    }

    #[test]
    fn test_user_message_unreachable_mentions_starting_the_service() {
        let err: RecommendError = SearchError::Unreachable {
            message: "refused".to_string(),
        }
        .into();
        assert!(err.user_message().contains("Start it"));
    }
}
