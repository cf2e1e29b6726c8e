//! Safety predicate for corpus quotes.
//!
//! This predicate is authoritative: no downstream component may surface a
//! quote that fails it, not even as a fallback.

use crate::corpus::Quote;

/// Moods for which a maximally activating quote is never appropriate.
pub const LOW_ENERGY_MOODS: [&str; 2] = ["tired", "sad"];

/// Whether a quote may be shown given the user's mood and energy ceiling.
///
/// Rejects any quote with a safety flag, any energy-3 quote when the mood is
/// tired or sad, and anything above the cap. Pure and deterministic.
pub fn is_safe(quote: &Quote, mood: Option<&str>, energy_cap: u8) -> bool {
    if quote.has_safety_flag() {
        return false;
    }
    if mood.is_some_and(|m| LOW_ENERGY_MOODS.contains(&m)) && quote.energy >= 3 {
        return false;
    }
    quote.energy <= energy_cap
}
