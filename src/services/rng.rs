//! Random source construction
//!
//! Sampling never touches a global generator; callers own an `Rng` and pass it
//! in. This module builds one from a configured seed.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Create the generator used for sensor sampling
///
/// If seed is 0, uses random entropy for non-deterministic behavior.
/// Otherwise, uses the provided seed for reproducible results.
pub fn sensor_rng(seed: u64) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    }
}
