//! Additive relevance scoring for corpus quotes.
//!
//! Every term is independent and clamped where noted; the terms simply sum.
//! There is no normalization: the result is a relative ranking signal, not a
//! probability.

use crate::context::{DayLoad, TimeBucket, UserContext, Weather};
use crate::corpus::{Quote, QuoteLength, Tone};
use crate::history::HistoryState;

/// Bonus for an exact mood match.
const MOOD_MATCH: f64 = 0.30;
/// Bonus for a mood-agnostic quote when the context carries a mood.
const MOOD_AGNOSTIC: f64 = 0.06;
/// Bonus for matching the preferred tone.
const TONE_MATCH: f64 = 0.15;
/// Recency window: a quote shown fewer than this many positions ago is penalized.
const RECENCY_WINDOW: usize = 14;

/// Score one quote against the request context, learned preferences and
/// recency, for a given time-of-day bucket.
///
/// The bucket is passed explicitly so the time term stays deterministic;
/// callers on the live path derive it from [`TimeBucket::now`].
pub fn score(
    quote: &Quote,
    ctx: &UserContext,
    state: &HistoryState,
    bucket: TimeBucket,
) -> f64 {
    let mut s = 0.0;

    match (&ctx.mood, &quote.mood) {
        (Some(ctx_mood), Some(quote_mood)) if ctx_mood == quote_mood => s += MOOD_MATCH,
        (Some(_), None) => s += MOOD_AGNOSTIC,
        _ => {}
    }

    if ctx.tone_pref == Some(quote.tone) {
        s += TONE_MATCH;
    }

    match bucket {
        TimeBucket::Evening => {
            if quote.energy == 1 {
                s += 0.02;
            }
            if matches!(quote.tone, Tone::Poetic | Tone::Stoic) {
                s += 0.01;
            }
        }
        TimeBucket::Morning => {
            if quote.energy >= 2 && quote.tone != Tone::Accompanying {
                s += 0.01;
            }
        }
        TimeBucket::Midday => {}
    }

    match ctx.day_load {
        Some(DayLoad::Dense) => match quote.length {
            QuoteLength::Short => s += 0.06,
            QuoteLength::Long => s -= 0.04,
            QuoteLength::Medium => {}
        },
        Some(DayLoad::Light) => {
            if matches!(quote.length, QuoteLength::Medium | QuoteLength::Long) {
                s += 0.03;
            }
        }
        None => {}
    }

    match ctx.weather {
        Some(Weather::Overcast) => {
            if matches!(quote.tone, Tone::Accompanying | Tone::Poetic) {
                s += 0.04;
            }
            if quote.tone == Tone::Direct {
                s -= 0.02;
            }
        }
        Some(Weather::Clear) => {
            if matches!(quote.tone, Tone::Neutral | Tone::Direct) {
                s += 0.02;
            }
        }
        None => {}
    }

    // Steepest for the most recently shown, decaying to zero at the window edge.
    if let Some(dist) = state.seen_distance(&quote.id) {
        if dist < RECENCY_WINDOW {
            s -= 0.20 - dist as f64 * 0.01;
        }
    }

    let need_like = state.like(&format!("need:{}", quote.need));
    s += (need_like as f64 * 0.02).clamp(0.0, 0.08);
    let tone_like = state.like(&format!("tone:{}", quote.tone));
    s += (tone_like as f64 * 0.015).clamp(0.0, 0.06);

    s
}
