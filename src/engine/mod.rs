//! Local heuristic recommendation engine.
//!
//! Composes the safety filter, the additive scorer and the weighted sampler
//! into one synchronous `pick` over the static corpus. The engine never
//! suspends; durable history IO happens at the orchestrator boundary.

mod safety;
mod sampler;
mod scoring;

pub use safety::{is_safe, LOW_ENERGY_MOODS};
pub use sampler::{sample_weighted, weight, TOP_CANDIDATES};
pub use scoring::score;

use std::cmp::Ordering;

use rand::Rng;
use tracing::{debug, info};

use crate::context::{TimeBucket, UserContext, DEFAULT_ENERGY_CAP};
use crate::corpus::{Corpus, Quote};
use crate::history::HistoryState;

/// Outcome of a successful local pick.
#[derive(Debug, Clone)]
pub struct RulesPick {
    /// The chosen quote.
    pub quote: Quote,
    /// Its relevance score at draw time.
    pub score: f64,
    /// Whether the seen window was reset because every quote had been shown.
    pub pool_reset: bool,
}

/// The local rules-based recommendation engine.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    /// Energy ceiling used when the request context does not carry one.
    default_energy_cap: Option<u8>,
}

impl RulesEngine {
    /// Create an engine with no configured default cap (falls back to 3).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stored-preference energy ceiling fallback.
    pub fn with_default_energy_cap(mut self, cap: u8) -> Self {
        self.default_energy_cap = Some(cap.clamp(1, DEFAULT_ENERGY_CAP));
        self
    }

    /// The cap in effect for a request: context cap, then the configured
    /// default, then 3.
    pub fn effective_energy_cap(&self, ctx: &UserContext) -> u8 {
        ctx.energy_cap
            .or(self.default_energy_cap)
            .unwrap_or(DEFAULT_ENERGY_CAP)
    }

    /// Pick one quote for the given context.
    ///
    /// Mutates `state` only when the unseen pool is exhausted: the seen
    /// window is reset and the search restarts over the full corpus. The
    /// caller must persist the state afterwards so the reset sticks.
    ///
    /// Returns `None` when even the degraded fallback pool is empty.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        corpus: &Corpus,
        ctx: &UserContext,
        state: &mut HistoryState,
        rng: &mut R,
    ) -> Option<RulesPick> {
        self.pick_at(corpus, ctx, state, TimeBucket::now(), rng)
    }

    /// Same as [`pick`](Self::pick) with an explicit time bucket.
    pub fn pick_at<R: Rng + ?Sized>(
        &self,
        corpus: &Corpus,
        ctx: &UserContext,
        state: &mut HistoryState,
        bucket: TimeBucket,
        rng: &mut R,
    ) -> Option<RulesPick> {
        let cap = self.effective_energy_cap(ctx);
        let mood = ctx.mood.as_deref();

        // Full-cycle exhaustion policy: once everything has been shown,
        // clear the seen window and start the cycle over.
        let mut pool_reset = false;
        let mut unseen: Vec<&Quote> = corpus
            .quotes()
            .iter()
            .filter(|q| !state.has_seen(&q.id))
            .collect();
        if unseen.is_empty() {
            info!(corpus_size = corpus.len(), "Seen pool exhausted, resetting history window");
            state.reset_seen();
            pool_reset = true;
            unseen = corpus.quotes().iter().collect();
        }

        let mut pool: Vec<&Quote> = unseen.clone();
        if let Some(need) = ctx.need.as_deref() {
            pool.retain(|q| q.need == need);
        }
        pool.retain(|q| is_safe(q, mood, cap));

        if pool.is_empty() {
            // Graceful degradation: drop only the need filter. The safety
            // predicate stays authoritative even here.
            debug!("Filtered pool empty, falling back to safe unseen quotes");
            pool = unseen
                .into_iter()
                .filter(|q| is_safe(q, mood, cap))
                .collect();
        }

        if pool.is_empty() {
            return None;
        }

        let mut scored: Vec<(f64, &Quote)> = pool
            .into_iter()
            .map(|q| (score(q, ctx, state, bucket), q))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(TOP_CANDIDATES);

        let scores: Vec<f64> = scored.iter().map(|(s, _)| *s).collect();
        let idx = sample_weighted(&scores, rng)?;
        let (picked_score, picked) = scored[idx];

        debug!(
            quote_id = %picked.id,
            score = picked_score,
            candidates = scores.len(),
            pool_reset,
            "Rules engine picked a quote"
        );

        Some(RulesPick {
            quote: picked.clone(),
            score: picked_score,
            pool_reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{QuoteLength, Tone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quote(id: &str, need: &str, mood: Option<&str>, energy: u8) -> Quote {
        Quote {
            id: id.to_string(),
            text: format!("text {id}"),
            need: need.to_string(),
            mood: mood.map(|m| m.to_string()),
            tone: Tone::Neutral,
            energy,
            length: QuoteLength::Short,
            author: None,
            language: "en".to_string(),
            is_injunctive: false,
            is_guilt_inducing: false,
            is_toxic_positive: false,
        }
    }

    #[test]
    fn test_sad_mood_excludes_activating_quote_survivor_is_certain() {
        // "a" fails the safety filter (mood sad + energy 3); "b" is the
        // only survivor and must be returned with probability 1.
        let corpus = Corpus::new(vec![
            quote("a", "calm", Some("sad"), 3),
            quote("b", "calm", None, 1),
        ])
        .unwrap();
        let ctx = UserContext::new()
            .with_need("calm")
            .with_mood("sad")
            .with_energy_cap(2);
        let engine = RulesEngine::new();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = HistoryState::new();
            let pick = engine
                .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
                .unwrap();
            assert_eq!(pick.quote.id, "b");
        }
    }

    #[test]
    fn test_need_filter_applies() {
        let corpus = Corpus::new(vec![
            quote("a", "calm", None, 1),
            quote("b", "courage", None, 1),
        ])
        .unwrap();
        let ctx = UserContext::new().with_need("courage");
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = HistoryState::new();

        let pick = RulesEngine::new()
            .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
            .unwrap();
        assert_eq!(pick.quote.id, "b");
    }

    #[test]
    fn test_fallback_ignores_need_when_pool_empties() {
        // No quote matches the requested need; the safe unseen pool is used.
        let corpus = Corpus::new(vec![quote("a", "calm", None, 1)]).unwrap();
        let ctx = UserContext::new().with_need("focus");
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = HistoryState::new();

        let pick = RulesEngine::new()
            .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
            .unwrap();
        assert_eq!(pick.quote.id, "a");
    }

    #[test]
    fn test_fallback_never_surfaces_flagged_or_over_cap_quotes() {
        let mut flagged = quote("flagged", "calm", None, 1);
        flagged.is_guilt_inducing = true;
        let corpus = Corpus::new(vec![flagged, quote("hot", "calm", None, 3)]).unwrap();
        let ctx = UserContext::new().with_need("focus").with_energy_cap(2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = HistoryState::new();

        let pick =
            RulesEngine::new().pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng);
        assert!(pick.is_none());
    }

    #[test]
    fn test_exhaustion_resets_and_still_returns() {
        let corpus = Corpus::new(vec![
            quote("a", "calm", None, 1),
            quote("b", "calm", None, 1),
            quote("c", "calm", None, 1),
        ])
        .unwrap();
        let ctx = UserContext::new().with_need("calm");
        let engine = RulesEngine::new();
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = HistoryState::new();

        // Exhaust the corpus.
        for _ in 0..corpus.len() {
            let pick = engine
                .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
                .unwrap();
            assert!(!pick.pool_reset);
            state.push_seen(pick.quote.id.clone(), None);
        }

        // Next pick still succeeds, via the reset.
        let pick = engine
            .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
            .unwrap();
        assert!(pick.pool_reset);
    }

    #[test]
    fn test_seen_quotes_are_excluded_until_exhaustion() {
        let corpus = Corpus::new(vec![
            quote("a", "calm", None, 1),
            quote("b", "calm", None, 1),
        ])
        .unwrap();
        let ctx = UserContext::new();
        let engine = RulesEngine::new();
        let mut rng = StdRng::seed_from_u64(5);

        let mut state = HistoryState::new();
        state.push_seen("a", None);
        let pick = engine
            .pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
            .unwrap();
        assert_eq!(pick.quote.id, "b");
    }

    #[test]
    fn test_picked_quotes_always_satisfy_safety() {
        // Property over a mixed corpus: every returned quote passes the
        // authoritative predicate.
        let mut quotes = Vec::new();
        for i in 0..30 {
            let mut q = quote(
                &format!("q{i}"),
                if i % 2 == 0 { "calm" } else { "courage" },
                if i % 3 == 0 { Some("sad") } else { None },
                (i % 3 + 1) as u8,
            );
            q.is_injunctive = i % 7 == 0;
            q.is_toxic_positive = i % 11 == 0;
            quotes.push(q);
        }
        let corpus = Corpus::new(quotes).unwrap();
        let ctx = UserContext::new().with_mood("sad").with_energy_cap(2);
        let engine = RulesEngine::new();
        let cap = engine.effective_energy_cap(&ctx);

        let mut rng = StdRng::seed_from_u64(99);
        let mut state = HistoryState::new();
        for _ in 0..100 {
            if let Some(pick) =
                engine.pick_at(&corpus, &ctx, &mut state, TimeBucket::Midday, &mut rng)
            {
                assert!(!pick.quote.has_safety_flag());
                assert!(pick.quote.energy <= cap);
                assert!(!(pick.quote.energy >= 3));
                state.push_seen(pick.quote.id.clone(), None);
            }
        }
    }

    #[test]
    fn test_effective_energy_cap_fallback_chain() {
        let engine = RulesEngine::new().with_default_energy_cap(2);
        assert_eq!(
            engine.effective_energy_cap(&UserContext::new().with_energy_cap(1)),
            1
        );
        assert_eq!(engine.effective_energy_cap(&UserContext::new()), 2);
        assert_eq!(
            RulesEngine::new().effective_energy_cap(&UserContext::new()),
            3
        );
    }
}
