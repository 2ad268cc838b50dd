//! Seeded random number generation.
//!
//! Every stochastic component receives its generator explicitly; nothing
//! in this crate draws from a thread-local or global source once a run
//! has started.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a reproducible generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Resolves an optional configured seed, drawing a fresh one when absent.
///
/// The returned seed is the one actually used, so callers can log it and
/// replay the run later.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) => s,
        None => rand::random(),
    }
}
