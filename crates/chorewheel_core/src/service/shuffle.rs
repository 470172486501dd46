//! Randomness port used to break ties between equally burdened people.
//!
//! # Responsibility
//! - Expose one operation: permute a list of names in place.
//! - Keep the random source injectable so runs can be reproduced.
//!
//! # Invariants
//! - Implementations only reorder; they never add or drop names.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of random permutations.
pub trait Shuffler {
    fn permute(&mut self, people: &mut [String]);
}

/// `rand`-backed shuffler.
pub struct RandShuffler<R = StdRng> {
    rng: R,
}

impl RandShuffler<StdRng> {
    /// Reproducible shuffler for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Shuffler seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandShuffler<R> {
    /// Wraps any `rand` generator.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Shuffler for RandShuffler<R> {
    fn permute(&mut self, people: &mut [String]) {
        people.shuffle(&mut self.rng);
    }
}

/// Identity permutation. Makes allocation order fully deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveOrder;

impl Shuffler for PreserveOrder {
    fn permute(&mut self, _people: &mut [String]) {}
}

#[cfg(test)]
mod tests {
    use super::{PreserveOrder, RandShuffler, Shuffler};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names() -> Vec<String> {
        (0..12).map(|index| format!("p{index}")).collect()
    }

    #[test]
    fn same_seed_gives_same_permutation() {
        let mut first = names();
        let mut second = names();
        RandShuffler::seeded(7).permute(&mut first);
        RandShuffler::seeded(7).permute(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        let mut expected = names();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn caller_supplied_rng_matches_seeded_constructor() {
        let mut wrapped = names();
        let mut seeded = names();
        RandShuffler::with_rng(StdRng::seed_from_u64(42)).permute(&mut wrapped);
        RandShuffler::seeded(42).permute(&mut seeded);
        assert_eq!(wrapped, seeded);
    }

    #[test]
    fn preserve_order_is_identity() {
        let mut people = names();
        PreserveOrder.permute(&mut people);
        assert_eq!(people, names());
    }
}
