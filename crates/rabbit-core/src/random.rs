//! Random Draws
//!
//! Every draw is independent and nothing is replayed, so callers hand in
//! whatever generator they like: entropy-seeded in the binary, fixed seeds in
//! tests.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Uniform float in `[0, 1)`.
pub fn roll(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Returns true with the given probability. Probabilities outside `[0, 1]`
/// saturate: `<= 0` never fires, `>= 1` always does.
pub fn chance(rng: &mut dyn RngCore, probability: f64) -> bool {
    roll(rng) < probability
}

/// Uniformly picks one item, `None` for an empty slice.
pub fn pick<'a, T>(rng: &mut dyn RngCore, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
