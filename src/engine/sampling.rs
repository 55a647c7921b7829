use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

use crate::error::{MealError, Result};
use crate::models::MealCombination;

/// Shuffle a copy of `combinations` and keep the first `min(cap, len)`.
///
/// This is an unbiased random subset, not a top-k: the provider's order does not
/// survive. The input slice is left untouched.
pub fn sample_with<R: Rng + ?Sized>(
    combinations: &[MealCombination],
    cap: usize,
    rng: &mut R,
) -> Vec<MealCombination> {
    let mut shuffled = combinations.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(cap);
    shuffled
}

/// Bounded random sampling with an injectable random source.
pub struct SampleSelector {
    cap: usize,
    rng: Mutex<StdRng>,
}

impl SampleSelector {
    /// Sampler seeded from OS entropy.
    pub fn new(cap: usize) -> Result<Self> {
        Self::with_rng(cap, StdRng::from_entropy())
    }

    /// Deterministic sampler for tests and reproducible runs.
    pub fn seeded(cap: usize, seed: u64) -> Result<Self> {
        Self::with_rng(cap, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cap: usize, rng: StdRng) -> Result<Self> {
        if cap == 0 {
            return Err(MealError::InvalidInput(
                "sample cap must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            cap,
            rng: Mutex::new(rng),
        })
    }

    pub fn sample(&self, combinations: &[MealCombination]) -> Vec<MealCombination> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sample_with(combinations, self.cap, &mut *rng)
    }
}
