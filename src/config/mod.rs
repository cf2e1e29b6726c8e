use std::env;
use std::path::PathBuf;

use crate::error::RecommendError;
use crate::orchestrator::Mode;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Configured recommendation strategy.
    pub mode: Mode,
    pub corpus: CorpusConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub generative: GenerativeConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    /// Stored-preference energy ceiling, used when a request carries none.
    pub default_energy_cap: Option<u8>,
}

/// Corpus document configuration
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

/// History database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Semantic search service configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
}

/// Generative service configuration
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    /// Optional; generative requests fail fast without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, RecommendError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mode = match env::var("RECONFORT_MODE") {
            Ok(raw) => raw.parse().map_err(|message| RecommendError::Config { message })?,
            Err(_) => Mode::Rules,
        };

        let corpus = CorpusConfig {
            path: PathBuf::from(
                env::var("CORPUS_PATH").unwrap_or_else(|_| "./data/citations.json".to_string()),
            ),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/history.db".to_string()),
            ),
        };

        let search = SearchConfig {
            base_url: env::var("SEARCH_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),
        };

        let generative = GenerativeConfig {
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: env::var("GENERATIVE_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("GENERATIVE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
        };

        let default_energy_cap = env::var("DEFAULT_ENERGY_CAP")
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
            .map(|cap| cap.clamp(1, 3));

        Ok(Config {
            mode,
            corpus,
            database,
            search,
            generative,
            logging,
            request,
            default_energy_cap,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}
