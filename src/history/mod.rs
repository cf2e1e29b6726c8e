//! Recommendation history and learned preferences.
//!
//! The whole history is one durable value per user profile, read and
//! rewritten as a unit on every mutation. All access is single-threaded from
//! the caller's point of view, so no partial-field transactions are needed.
//! The store is an explicitly owned, injectable object; callers pass it
//! through the orchestrator, there is no ambient singleton.

mod sqlite;

pub use sqlite::SqliteHistoryStore;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::FeedbackKind;
use crate::corpus::Quote;
use crate::error::StorageResult;

/// Maximum number of seen quote ids kept; oldest evicted first.
pub const SEEN_IDS_CAP: usize = 60;
/// Maximum number of seen literal texts kept; oldest evicted first.
pub const SEEN_TEXTS_CAP: usize = 30;
/// Lower clamp for a preference counter.
pub const LIKES_MIN: i32 = -3;
/// Upper clamp for a preference counter.
pub const LIKES_MAX: i32 = 8;

/// The last explicit feedback event, informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Id of the quote the feedback was about.
    pub quote_id: String,
    /// What the user signalled.
    pub kind: FeedbackKind,
    /// When the feedback was recorded.
    pub at: DateTime<Utc>,
}

/// Durable per-profile history: seen window plus bounded preference counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryState {
    /// Ids of quotes already shown, insertion order, capped at [`SEEN_IDS_CAP`].
    #[serde(default)]
    pub seen_ids: Vec<String>,
    /// Literal texts already shown, for strategies without stable ids,
    /// capped at [`SEEN_TEXTS_CAP`].
    #[serde(default)]
    pub seen_texts: Vec<String>,
    /// Feedback counters keyed by `need:<value>` or `tone:<value>`,
    /// clamped to [[`LIKES_MIN`], [`LIKES_MAX`]].
    #[serde(default)]
    pub likes: HashMap<String, i32>,
    /// Last feedback event, if any.
    #[serde(default)]
    pub last_feedback: Option<FeedbackRecord>,
}

impl HistoryState {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shown quote. The text is recorded too when given, so future
    /// generative calls can steer away from recent literal outputs.
    ///
    /// Caps are enforced on every write and are never exceeded.
    pub fn push_seen(&mut self, id: impl Into<String>, text: Option<&str>) {
        self.seen_ids.push(id.into());
        if self.seen_ids.len() > SEEN_IDS_CAP {
            let excess = self.seen_ids.len() - SEEN_IDS_CAP;
            self.seen_ids.drain(..excess);
        }
        if let Some(text) = text {
            self.seen_texts.push(text.to_string());
            if self.seen_texts.len() > SEEN_TEXTS_CAP {
                let excess = self.seen_texts.len() - SEEN_TEXTS_CAP;
                self.seen_texts.drain(..excess);
            }
        }
    }

    /// Whether a quote id is in the seen window.
    pub fn has_seen(&self, id: &str) -> bool {
        self.seen_ids.iter().any(|s| s == id)
    }

    /// Positions since the id was last shown (0 = just shown), if present.
    pub fn seen_distance(&self, id: &str) -> Option<usize> {
        self.seen_ids
            .iter()
            .rposition(|s| s == id)
            .map(|pos| self.seen_ids.len() - 1 - pos)
    }

    /// The most recent seen texts, newest last, at most `limit` entries.
    pub fn recent_texts(&self, limit: usize) -> &[String] {
        let start = self.seen_texts.len().saturating_sub(limit);
        &self.seen_texts[start..]
    }

    /// The most recent seen ids, newest last, at most `limit` entries.
    pub fn recent_ids(&self, limit: usize) -> &[String] {
        let start = self.seen_ids.len().saturating_sub(limit);
        &self.seen_ids[start..]
    }

    /// Apply explicit feedback for a quote.
    ///
    /// `up`/`down` move both the `need:` and `tone:` counters by one, clamped;
    /// `mid` moves nothing. The last-feedback record is always updated.
    pub fn apply_feedback(&mut self, quote: &Quote, kind: FeedbackKind) {
        let delta = kind.delta();
        if delta != 0 {
            self.bump_like(format!("need:{}", quote.need), delta);
            self.bump_like(format!("tone:{}", quote.tone), delta);
        }
        self.last_feedback = Some(FeedbackRecord {
            quote_id: quote.id.clone(),
            kind,
            at: Utc::now(),
        });
    }

    /// Preference counter for a key, 0 when absent.
    pub fn like(&self, key: &str) -> i32 {
        self.likes.get(key).copied().unwrap_or(0)
    }

    /// Clear the seen window after full-cycle exhaustion. Likes are kept;
    /// the user's taste survives a reset, the repetition guard does not.
    pub fn reset_seen(&mut self) {
        self.seen_ids.clear();
    }

    fn bump_like(&mut self, key: String, delta: i32) {
        let entry = self.likes.entry(key).or_insert(0);
        *entry = (*entry + delta).clamp(LIKES_MIN, LIKES_MAX);
    }
}

/// Durable backing store for [`HistoryState`].
///
/// Implementations load and save the state as a whole value; there is no
/// finer-grained mutation at this boundary.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the state, or an empty one if none was saved yet.
    async fn load(&self) -> StorageResult<HistoryState>;

    /// Persist the whole state, replacing any previous value.
    async fn save(&self, state: &HistoryState) -> StorageResult<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    state: std::sync::Mutex<HistoryState>,
}

impl MemoryHistoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> StorageResult<HistoryState> {
        Ok(self.state.lock().expect("history mutex poisoned").clone())
    }

    async fn save(&self, state: &HistoryState) -> StorageResult<()> {
        *self.state.lock().expect("history mutex poisoned") = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{QuoteLength, Tone};

    fn quote(id: &str, need: &str, tone: Tone) -> Quote {
        Quote {
            id: id.to_string(),
            text: "text".to_string(),
            need: need.to_string(),
            mood: None,
            tone,
            energy: 1,
            length: QuoteLength::Short,
            author: None,
            language: "en".to_string(),
            is_injunctive: false,
            is_guilt_inducing: false,
            is_toxic_positive: false,
        }
    }

    #[test]
    fn test_seen_ids_fifo_eviction() {
        let mut state = HistoryState::new();
        for i in 0..75 {
            state.push_seen(format!("q{i}"), None);
            assert!(state.seen_ids.len() <= SEEN_IDS_CAP);
        }
        assert_eq!(state.seen_ids.len(), SEEN_IDS_CAP);
        // Oldest entries from more than 60 pushes ago are gone.
        assert!(!state.has_seen("q0"));
        assert!(!state.has_seen("q14"));
        assert!(state.has_seen("q15"));
        assert!(state.has_seen("q74"));
    }

    #[test]
    fn test_seen_texts_capped_independently() {
        let mut state = HistoryState::new();
        for i in 0..40 {
            state.push_seen(format!("q{i}"), Some(&format!("text {i}")));
        }
        assert_eq!(state.seen_ids.len(), 40);
        assert_eq!(state.seen_texts.len(), SEEN_TEXTS_CAP);
        assert_eq!(state.seen_texts[0], "text 10");
    }

    #[test]
    fn test_seen_distance() {
        let mut state = HistoryState::new();
        state.push_seen("a", None);
        state.push_seen("b", None);
        state.push_seen("a", None);
        state.push_seen("c", None);

        // Distance counts from the most recent occurrence.
        assert_eq!(state.seen_distance("c"), Some(0));
        assert_eq!(state.seen_distance("a"), Some(1));
        assert_eq!(state.seen_distance("b"), Some(2));
        assert_eq!(state.seen_distance("z"), None);
    }

    #[test]
    fn test_likes_clamped_under_feedback_flood() {
        let mut state = HistoryState::new();
        let q = quote("q1", "calm", Tone::Direct);

        for _ in 0..50 {
            state.apply_feedback(&q, FeedbackKind::Up);
        }
        assert_eq!(state.like("need:calm"), LIKES_MAX);
        assert_eq!(state.like("tone:direct"), LIKES_MAX);

        for _ in 0..50 {
            state.apply_feedback(&q, FeedbackKind::Down);
        }
        assert_eq!(state.like("need:calm"), LIKES_MIN);
        assert_eq!(state.like("tone:direct"), LIKES_MIN);
    }

    #[test]
    fn test_mid_feedback_records_but_does_not_move_likes() {
        let mut state = HistoryState::new();
        let q = quote("q1", "calm", Tone::Neutral);

        state.apply_feedback(&q, FeedbackKind::Mid);
        assert!(state.likes.is_empty());
        let record = state.last_feedback.as_ref().unwrap();
        assert_eq!(record.quote_id, "q1");
        assert_eq!(record.kind, FeedbackKind::Mid);
    }

    #[test]
    fn test_reset_seen_preserves_likes() {
        let mut state = HistoryState::new();
        let q = quote("q1", "calm", Tone::Poetic);
        state.push_seen("q1", None);
        state.apply_feedback(&q, FeedbackKind::Up);

        state.reset_seen();
        assert!(state.seen_ids.is_empty());
        assert_eq!(state.like("need:calm"), 1);
    }

    #[test]
    fn test_recent_windows() {
        let mut state = HistoryState::new();
        for i in 0..5 {
            state.push_seen(format!("q{i}"), Some(&format!("t{i}")));
        }
        assert_eq!(state.recent_ids(3), &["q2", "q3", "q4"]);
        assert_eq!(state.recent_texts(2), &["t3", "t4"]);
        assert_eq!(state.recent_ids(99).len(), 5);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryHistoryStore::new();
        assert!(store.load().await.unwrap().seen_ids.is_empty());

        let mut state = HistoryState::new();
        state.push_seen("q1", Some("hello"));
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.seen_ids, vec!["q1"]);
        assert_eq!(loaded.seen_texts, vec!["hello"]);
    }
}
