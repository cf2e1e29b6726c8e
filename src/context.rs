//! Per-request user context and the small closed sets derived from it.
//!
//! A [`UserContext`] is built fresh for every recommendation request and is
//! never persisted as-is; only its effects on the history survive it.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::corpus::Tone;

/// Highest energy a quote may carry when no cap is supplied anywhere.
pub const DEFAULT_ENERGY_CAP: u8 = 3;

/// Ephemeral context for one recommendation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// Requested need category, if the user picked one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need: Option<String>,
    /// Current mood, if the user picked one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Preferred voice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_pref: Option<Tone>,
    /// Energy ceiling (1-3) for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_cap: Option<u8>,
    /// Free-form text the user typed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    /// Label of the unified question flow (remote strategies only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_label: Option<String>,
    /// Text of the unified question flow (remote strategies only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    /// How packed the user's day is, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_load: Option<DayLoad>,
    /// Outside weather, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

impl UserContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the need category.
    pub fn with_need(mut self, need: impl Into<String>) -> Self {
        self.need = Some(need.into());
        self
    }

    /// Set the current mood.
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    /// Set the preferred tone.
    pub fn with_tone_pref(mut self, tone: Tone) -> Self {
        self.tone_pref = Some(tone);
        self
    }

    /// Set the energy ceiling, clamped to 1-3.
    pub fn with_energy_cap(mut self, cap: u8) -> Self {
        self.energy_cap = Some(cap.clamp(1, DEFAULT_ENERGY_CAP));
        self
    }

    /// Set the free-form text.
    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    /// Set the unified question label and text.
    pub fn with_question(
        mut self,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.question_label = Some(label.into());
        self.question_text = Some(text.into());
        self
    }

    /// Set the day-load modifier.
    pub fn with_day_load(mut self, load: DayLoad) -> Self {
        self.day_load = Some(load);
        self
    }

    /// Set the weather modifier.
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Whether the context carries a populated unified question.
    ///
    /// A rules-mode request with a unified question is upgraded to semantic
    /// search; the local engine only serves the legacy need/mood-chip flow.
    pub fn has_unified_question(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        filled(&self.question_label) || filled(&self.question_text)
    }
}

/// Explicit like/dislike feedback on a displayed quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// The quote landed well.
    Up,
    /// Indifferent; recorded but does not move preferences.
    Mid,
    /// The quote missed.
    Down,
}

impl FeedbackKind {
    /// Preference delta applied to the need and tone counters.
    pub fn delta(&self) -> i32 {
        match self {
            FeedbackKind::Up => 1,
            FeedbackKind::Mid => 0,
            FeedbackKind::Down => -1,
        }
    }

    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Up => "up",
            FeedbackKind::Mid => "mid",
            FeedbackKind::Down => "down",
        }
    }
}

impl std::str::FromStr for FeedbackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(FeedbackKind::Up),
            "mid" => Ok(FeedbackKind::Mid),
            "down" => Ok(FeedbackKind::Down),
            _ => Err(format!("Unknown feedback kind: {}", s)),
        }
    }
}

/// Time-of-day bucket derived from the local wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    /// Before 11:00.
    Morning,
    /// 11:00 to 17:59.
    Midday,
    /// From 18:00.
    Evening,
}

impl TimeBucket {
    /// Bucket for an hour of day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        if hour < 11 {
            TimeBucket::Morning
        } else if hour < 18 {
            TimeBucket::Midday
        } else {
            TimeBucket::Evening
        }
    }

    /// Bucket for the current local time.
    pub fn now() -> Self {
        Self::from_hour(chrono::Local::now().hour())
    }
}

/// How dense the user's day is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayLoad {
    /// Packed schedule; short quotes land better.
    Dense,
    /// Open schedule; longer quotes are welcome.
    Light,
}

/// Outside weather, as a coarse scoring modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Grey sky; softer tones fit.
    Overcast,
    /// Clear sky; plainer tones fit.
    Clear,
}
