//! Weighted random draw over a scored candidate set.
//!
//! The pick is intentionally stochastic, not argmax: repeated calls with
//! identical context must not always return the same quote, while still
//! biasing strongly toward higher-scored candidates.

use rand::Rng;

/// Candidates taken from the top of the scored pool.
pub const TOP_CANDIDATES: usize = 8;

/// Weight floor so the lowest-ranked candidate of the top set is never
/// fully silenced.
const WEIGHT_FLOOR: f64 = 0.001;

/// Base weight added on top of the score gap.
const WEIGHT_BASE: f64 = 0.05;

/// Weight for a candidate score relative to the lowest score in the set.
pub fn weight(score: f64, min_score: f64) -> f64 {
    (score - min_score + WEIGHT_BASE).max(WEIGHT_FLOOR)
}

/// Draw one index from `scores`, with likelihood proportional to
/// [`weight`]. Returns `None` on an empty slice.
///
/// The draw is uniform over the cumulative weight sum; the first candidate
/// whose cumulative weight crosses the draw point wins.
pub fn sample_weighted<R: Rng + ?Sized>(scores: &[f64], rng: &mut R) -> Option<usize> {
    let min_score = scores.iter().copied().fold(f64::INFINITY, f64::min);
    if !min_score.is_finite() {
        return None;
    }

    let weights: Vec<f64> = scores.iter().map(|&s| weight(s, min_score)).collect();
    let total: f64 = weights.iter().sum();

    let mut draw = rng.random_range(0.0..total);
    for (i, w) in weights.iter().enumerate() {
        draw -= w;
        if draw <= 0.0 {
            return Some(i);
        }
    }
    // Floating-point slack on the last cumulative step.
    Some(scores.len() - 1)
}
