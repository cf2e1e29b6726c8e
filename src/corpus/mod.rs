//! Quote corpus: the immutable collection the rules engine draws from.
//!
//! The corpus is a single static JSON document (an array of quotes) loaded
//! once at startup. A missing or malformed document leaves the rules
//! strategy permanently unavailable until a reload; the remote strategies do
//! not depend on it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, CorpusResult};

/// Voice of a quote. Closed set; matched against the user's tone preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Gentle, supportive voice.
    Accompanying,
    /// Plain, unadorned voice.
    Neutral,
    /// Frank, straight-to-the-point voice.
    Direct,
    /// Calm, composed voice.
    Stoic,
    /// Imagery-rich voice.
    Poetic,
}

impl Tone {
    /// Stable string form, used in preference keys and wire metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Accompanying => "accompanying",
            Tone::Neutral => "neutral",
            Tone::Direct => "direct",
            Tone::Stoic => "stoic",
            Tone::Poetic => "poetic",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accompanying" => Ok(Tone::Accompanying),
            "neutral" => Ok(Tone::Neutral),
            "direct" => Ok(Tone::Direct),
            "stoic" => Ok(Tone::Stoic),
            "poetic" => Ok(Tone::Poetic),
            _ => Err(format!("Unknown tone: {}", s)),
        }
    }
}

/// Length category of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteLength {
    /// One short sentence.
    Short,
    /// One or two sentences.
    Medium,
    /// A few sentences.
    Long,
}

/// One immutable corpus entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Stable unique identifier.
    pub id: String,
    /// The quote text itself.
    pub text: String,
    /// Need category tag (e.g. "calm", "courage").
    pub need: String,
    /// Optional mood tag; a mood-agnostic quote carries none.
    #[serde(default)]
    pub mood: Option<String>,
    /// Voice of the quote.
    pub tone: Tone,
    /// Activation level, 1 (soothing) to 3 (energizing).
    pub energy: u8,
    /// Length category.
    pub length: QuoteLength,
    /// Attributed author, if known.
    #[serde(default)]
    pub author: Option<String>,
    /// Language tag (e.g. "fr", "en").
    pub language: String,
    /// Phrased as a command ("you must..."). Always excluded.
    #[serde(default)]
    pub is_injunctive: bool,
    /// Shames the reader. Always excluded.
    #[serde(default)]
    pub is_guilt_inducing: bool,
    /// Dismisses hard feelings with forced cheer. Always excluded.
    #[serde(default)]
    pub is_toxic_positive: bool,
}

impl Quote {
    /// Whether any of the three safety flags is set.
    pub fn has_safety_flag(&self) -> bool {
        self.is_injunctive || self.is_guilt_inducing || self.is_toxic_positive
    }
}

/// The loaded, read-only quote collection.
#[derive(Debug, Clone)]
pub struct Corpus {
    quotes: Vec<Quote>,
}

impl Corpus {
    /// Build a corpus from already-parsed quotes. Empty input is rejected.
    pub fn new(quotes: Vec<Quote>) -> CorpusResult<Self> {
        if quotes.is_empty() {
            return Err(CorpusError::Empty);
        }
        Ok(Self { quotes })
    }

    /// Load the corpus from a JSON file containing an array of quotes.
    pub fn load(path: impl AsRef<Path>) -> CorpusResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| CorpusError::Io {
            message: e.to_string(),
        })?;
        Self::from_json(&raw)
    }

    /// Parse a corpus from a JSON document.
    pub fn from_json(raw: &str) -> CorpusResult<Self> {
        let quotes: Vec<Quote> = serde_json::from_str(raw).map_err(|e| CorpusError::Parse {
            message: e.to_string(),
        })?;
        Self::new(quotes)
    }

    /// All quotes, in document order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes in the corpus.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the corpus is empty. Never true for a constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Look up a quote by id.
    pub fn get(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }
}
