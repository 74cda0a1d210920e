//! Score aggregation.
//!
//! Pure functions over the per-dimension score map: seeding, delta
//! application, the weighted overall score, and the maturity tier lookup.
//! No hidden state; the caller owns the map.

use std::collections::BTreeMap;

use crate::domain::scenario::{Dimension, MaturityModel};

/// Seeds all five dimensions with `clamp(seed, 0, 100)`.
#[must_use]
pub fn initial_scores(seed: i32) -> BTreeMap<Dimension, i32> {
    let base = seed.clamp(0, 100);
    Dimension::ALL.iter().map(|d| (*d, base)).collect()
}

/// Applies a partial per-dimension delta in place.
///
/// Addition saturates at the `i32` bounds; when `clamp` is set the result is
/// further clamped to `[0, 100]`.
pub fn apply_delta(
    scores: &mut BTreeMap<Dimension, i32>,
    delta: &BTreeMap<Dimension, i32>,
    clamp: bool,
) {
    for (dimension, amount) in delta {
        let entry = scores.entry(*dimension).or_insert(0);
        let next = entry.saturating_add(*amount);
        *entry = if clamp { next.clamp(0, 100) } else { next };
    }
}

/// Computes the weighted overall score, rounded half away from zero.
///
/// Weights come from the maturity model; dimensions the model does not
/// weight contribute 0. The sum is rounded exactly once.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn overall_score(scores: &BTreeMap<Dimension, i32>, model: &MaturityModel) -> i32 {
    let total: f64 = scores
        .iter()
        .map(|(dimension, score)| {
            let weight = model
                .dimensions
                .iter()
                .find(|d| d.id == *dimension)
                .map_or(0.0, |d| d.weight);
            f64::from(*score) * weight
        })
        .sum();
    total.round() as i32
}

/// Resolves the maturity tier id for an overall score.
///
/// Returns the first declared tier whose inclusive `[minScore, maxScore]`
/// range contains `overall`; if none matches, falls back to the tier with
/// the lowest `minScore` (first declared wins ties).
#[must_use]
pub fn maturity_level(overall: i32, model: &MaturityModel) -> String {
    model
        .levels
        .iter()
        .find(|level| overall >= level.min_score && overall <= level.max_score)
        .or_else(|| model.levels.iter().min_by_key(|level| level.min_score))
        .map(|level| level.id.clone())
        .unwrap_or_default()
}
