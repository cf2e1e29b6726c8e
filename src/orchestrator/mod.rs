//! Strategy dispatch and the top-level recommendation entry point.
//!
//! The orchestrator owns the corpus, the two remote clients and the history
//! store. Every request runs one strategy to completion: there is no silent
//! fallback from a failed remote strategy to another one, and no partial
//! result is ever surfaced.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::context::{FeedbackKind, UserContext};
use crate::corpus::{Corpus, QuoteLength, Tone};
use crate::engine::RulesEngine;
use crate::error::{CorpusError, RecommendError, RecommendResult, SearchError};
use crate::generative::GenerativeClient;
use crate::history::{HistoryState, HistoryStore};
use crate::search::{
    build_search_query, SearchHit, SearchRequest, SemanticSearchClient, SEARCH_EXCLUDE_WINDOW,
    SEARCH_TOP_K,
};

/// Configured recommendation mode, chosen in settings and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Local heuristic engine over the static corpus.
    Rules,
    /// Remote semantic search service.
    SemanticSearch,
    /// Remote generative service.
    Generative,
}

impl Mode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rules => "rules",
            Mode::SemanticSearch => "semantic_search",
            Mode::Generative => "generative",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" => Ok(Mode::Rules),
            "semantic_search" | "search" => Ok(Mode::SemanticSearch),
            "generative" => Ok(Mode::Generative),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

/// The strategy actually executed for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Local heuristic pick.
    Rules,
    /// One semantic search round trip.
    SemanticSearch,
    /// One generation round trip.
    Generative,
}

/// Pure strategy decision for a request.
///
/// Generative and semantic search modes always run what was configured.
/// Rules mode is upgraded to semantic search when the context carries a
/// populated unified question: the local engine only serves the legacy
/// need/mood-chip flow.
pub fn decide(mode: Mode, ctx: &UserContext) -> Strategy {
    match mode {
        Mode::Generative => Strategy::Generative,
        Mode::SemanticSearch => Strategy::SemanticSearch,
        Mode::Rules if ctx.has_unified_question() => Strategy::SemanticSearch,
        Mode::Rules => Strategy::Rules,
    }
}

/// Structured metadata attached to a recommendation, by source strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RecommendationDetails {
    /// Local pick: the quote's categorical fields and its score at draw time.
    Rules {
        need: String,
        mood: Option<String>,
        tone: Tone,
        energy: u8,
        length: QuoteLength,
        score: f64,
    },
    /// Search result: relevance score, the query sent, and the runner-up hits.
    Search {
        score: f64,
        query: String,
        alternatives: Vec<SearchHit>,
    },
    /// Generated result: model identity and the exact prompt sent.
    Generative { model: String, prompt: String },
}

/// Normalized output of any strategy, ready to display and to track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Id usable for history tracking. Synthetic for generated quotes,
    /// which have no corpus identity.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Credited author, if any.
    pub author: Option<String>,
    /// Source-specific metadata.
    pub details: RecommendationDetails,
}

/// Top-level entry point: decides a strategy, runs it, normalizes the
/// result and updates history.
pub struct RecommendationOrchestrator<S: HistoryStore> {
    mode: Mode,
    corpus: Option<Corpus>,
    engine: RulesEngine,
    search: SemanticSearchClient,
    generative: GenerativeClient,
    store: S,
}

impl<S: HistoryStore> RecommendationOrchestrator<S> {
    /// Build an orchestrator from configuration.
    ///
    /// The corpus is optional: without it the rules strategy reports
    /// unavailable while the remote strategies keep working.
    pub fn new(config: &Config, corpus: Option<Corpus>, store: S) -> RecommendResult<Self> {
        let mut engine = RulesEngine::new();
        if let Some(cap) = config.default_energy_cap {
            engine = engine.with_default_energy_cap(cap);
        }

        Ok(Self {
            mode: config.mode,
            corpus,
            engine,
            search: SemanticSearchClient::new(&config.search, config.request.clone())?,
            generative: GenerativeClient::new(&config.generative, config.request.clone())?,
            store,
        })
    }

    /// The configured mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Masked display form of the generative credential.
    pub fn masked_api_key(&self) -> String {
        self.generative.masked_api_key()
    }

    /// Produce one recommendation for the given context.
    ///
    /// Takes `&mut self` deliberately: one orchestrator serves one request
    /// at a time, so two in-flight requests cannot race their history
    /// writes.
    pub async fn recommend(&mut self, ctx: &UserContext) -> RecommendResult<Recommendation> {
        let strategy = decide(self.mode, ctx);
        let start = Instant::now();

        debug!(mode = %self.mode, ?strategy, "Dispatching recommendation request");

        let result = match strategy {
            Strategy::Rules => self.recommend_rules(ctx).await,
            Strategy::SemanticSearch => self.recommend_search(ctx).await,
            Strategy::Generative => self.recommend_generative(ctx).await,
        };

        if let Ok(recommendation) = &result {
            info!(
                ?strategy,
                quote_id = %recommendation.id,
                latency_ms = start.elapsed().as_millis(),
                "Recommendation produced"
            );
        }

        result
    }

    /// Record explicit feedback for a corpus quote.
    ///
    /// Generated quotes have no durable identity to attach learning to, so
    /// they cannot receive feedback; their ids are unknown to the corpus
    /// and are rejected here.
    pub async fn feedback(&mut self, quote_id: &str, kind: FeedbackKind) -> RecommendResult<()> {
        let corpus = self.corpus.as_ref().ok_or(CorpusError::Unavailable)?;
        let quote = corpus
            .get(quote_id)
            .ok_or_else(|| RecommendError::UnknownQuote {
                quote_id: quote_id.to_string(),
            })?
            .clone();

        let mut state = self.store.load().await?;
        state.apply_feedback(&quote, kind);
        self.store.save(&state).await?;

        info!(quote_id = %quote.id, kind = kind.as_str(), "Feedback recorded");
        Ok(())
    }

    /// Current history state, for inspection surfaces.
    pub async fn history_state(&self) -> RecommendResult<HistoryState> {
        Ok(self.store.load().await?)
    }

    async fn recommend_rules(&mut self, ctx: &UserContext) -> RecommendResult<Recommendation> {
        let corpus = self.corpus.as_ref().ok_or(CorpusError::Unavailable)?;

        let mut state = self.store.load().await?;
        let pick = self
            .engine
            .pick(corpus, ctx, &mut state, &mut rand::rng())
            .ok_or_else(|| RecommendError::EmptyResult {
                message: "No quote matched these options.".to_string(),
            })?;

        state.push_seen(pick.quote.id.clone(), None);
        // One save covers both the pick and a possible exhaustion reset.
        self.store.save(&state).await?;

        let quote = pick.quote;
        Ok(Recommendation {
            id: quote.id.clone(),
            text: quote.text.clone(),
            author: quote.author.clone(),
            details: RecommendationDetails::Rules {
                need: quote.need,
                mood: quote.mood,
                tone: quote.tone,
                energy: quote.energy,
                length: quote.length,
                score: pick.score,
            },
        })
    }

    async fn recommend_search(&mut self, ctx: &UserContext) -> RecommendResult<Recommendation> {
        if !self.search.check_health().await {
            return Err(SearchError::Unreachable {
                message: "health probe failed".to_string(),
            }
            .into());
        }

        let mut state = self.store.load().await?;
        let query = build_search_query(ctx);
        let request = SearchRequest::new(&query, SEARCH_TOP_K)
            .with_exclude_ids(state.recent_ids(SEARCH_EXCLUDE_WINDOW).to_vec());

        let response = self.search.search(request).await?;
        let mut hits = response.results;
        if hits.is_empty() {
            return Err(RecommendError::EmptyResult {
                message: "Nothing found for this search.".to_string(),
            });
        }

        let top = hits.remove(0);
        state.push_seen(top.id.clone(), None);
        self.store.save(&state).await?;

        Ok(Recommendation {
            id: top.id.clone(),
            text: top.text.clone(),
            author: top.metadata.author.clone(),
            details: RecommendationDetails::Search {
                score: top.score,
                query,
                alternatives: hits,
            },
        })
    }

    async fn recommend_generative(&mut self, ctx: &UserContext) -> RecommendResult<Recommendation> {
        // Fail fast before any IO when no credential is configured.
        if !self.generative.has_api_key() {
            return Err(crate::error::GenerativeError::MissingCredential.into());
        }

        let mut state = self.store.load().await?;
        let generated = self
            .generative
            .generate_quote(ctx, &state.seen_texts)
            .await?;

        // Generated quotes have no corpus identity: mint a synthetic id and
        // keep the literal text so future generations can avoid
        // near-duplicates.
        let id = format!("gen-{}", Uuid::new_v4());
        state.push_seen(id.clone(), Some(&generated.quote.text));
        self.store.save(&state).await?;

        Ok(Recommendation {
            id,
            text: generated.quote.text,
            author: Some(generated.quote.author),
            details: RecommendationDetails::Generative {
                model: generated.model,
                prompt: generated.prompt,
            },
        })
    }
}
