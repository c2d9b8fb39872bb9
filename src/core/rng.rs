//! Deterministic random number generation for board setup.
//!
//! The authority seeds one `GameRng` per session. Independent draws (the
//! left and right tile stocks) use named sub-streams so that adding a draw
//! to one side never perturbs the other.
//!
//! ```
//! use trigon::core::GameRng;
//!
//! let rng = GameRng::new(42);
//! let mut left = rng.for_context("left");
//! let mut again = GameRng::new(42).for_context("left");
//!
//! let mut a = vec![1, 2, 3, 4, 5];
//! let mut b = a.clone();
//! left.shuffle(&mut a);
//! again.shuffle(&mut b);
//! assert_eq!(a, b);
//! ```

use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

/// Seeded ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a named purpose.
    ///
    /// `FxHasher` output is stable across runs and toolchains but hashes in
    /// `usize` words, so 32-bit and 64-bit builds derive different streams.
    /// Only the authority lays out the board, so peers never need to agree.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}
