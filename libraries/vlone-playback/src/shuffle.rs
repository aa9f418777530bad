//! Shuffle helpers for queue randomization and the smart-shuffle coin flip

use rand::seq::SliceRandom;
use rand::Rng;
use vlone_core::Track;

/// Shuffle tracks in place (Fisher-Yates)
///
/// Each track has equal probability of appearing at any position. The RNG is
/// injected so callers (and tests) control the permutation.
pub fn shuffle_tracks<R: Rng + ?Sized>(tracks: &mut [Track], rng: &mut R) {
    tracks.shuffle(rng);
}

/// Decide whether a smart-shuffle track end injects a random catalog track
///
/// `probability` is clamped into `[0, 1]`; 0 never injects, 1 always does.
pub fn should_inject<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    let probability = probability.clamp(0.0, 1.0);
    if probability >= 1.0 {
        return true;
    }
    rng.gen::<f64>() < probability
}
