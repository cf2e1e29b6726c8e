//! # Reconfort
//!
//! Recommendation core for short affective-support quotes, personalized by a
//! stated need, mood, tone preference and an energy ceiling, while avoiding
//! repetition and learning from explicit like/dislike feedback.
//!
//! ## Strategies
//!
//! - **Rules**: local heuristic engine over a static corpus - safety
//!   filtering, additive relevance scoring, anti-repetition and weighted
//!   sampling
//! - **Semantic search**: one round trip to a remote search service
//! - **Generative**: one round trip to a chat-completion service
//!
//! ## Architecture
//!
//! ```text
//! UI → RecommendationOrchestrator → RulesEngine (local, sync)
//!                 ↓                → SemanticSearchClient (HTTP)
//!            HistoryStore          → GenerativeClient (HTTP)
//!             (SQLite)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use reconfort::{Config, Corpus, RecommendationOrchestrator, UserContext};
//! use reconfort::history::SqliteHistoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let corpus = Corpus::load(&config.corpus.path).ok();
//!     let store = SqliteHistoryStore::new(&config.database.path).await?;
//!     let mut orchestrator = RecommendationOrchestrator::new(&config, corpus, store)?;
//!
//!     let ctx = UserContext::new().with_need("calm").with_mood("stressed");
//!     let recommendation = orchestrator.recommend(&ctx).await?;
//!     println!("{}", recommendation.text);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management loaded from the environment.
pub mod config;
/// Per-request user context and feedback kinds.
pub mod context;
/// Quote corpus data model and loader.
pub mod corpus;
/// Local heuristic recommendation engine.
pub mod engine;
/// Error types and result aliases for the application.
pub mod error;
/// Generative service client and completion parsing.
pub mod generative;
/// Durable recommendation history and learned preferences.
pub mod history;
/// Strategy dispatch and the top-level orchestrator.
pub mod orchestrator;
/// Prompt construction for the generative strategy.
pub mod prompts;
/// Semantic search service client and query building.
pub mod search;

pub use config::Config;
pub use context::{FeedbackKind, UserContext};
pub use corpus::{Corpus, Quote, Tone};
pub use engine::RulesEngine;
pub use error::{RecommendError, RecommendResult};
pub use history::{HistoryState, HistoryStore};
pub use orchestrator::{
    decide, Mode, Recommendation, RecommendationDetails, RecommendationOrchestrator, Strategy,
};
