//! Deterministic random number streams.
//!
//! Generation and shuffling draw from independent [`ChaCha8Rng`] streams derived from one
//! seed, so adding datasets does not change how the existing ones are shuffled.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Creates the stream called `name` of `seed`.
pub fn stream(seed: u64, name: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(seed, name))
}

/// Mixes the stream name into the seed.
fn derive_seed(seed: u64, name: &str) -> u64 {
    name.bytes().fold(
        seed.wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407),
        |acc, byte| {
            (acc ^ byte as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407)
        },
    )
}
