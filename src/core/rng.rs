//! Deterministic random number generation.
//!
//! Every probability check in a battle ("30% chance to paralyze") draws from
//! the single [`BattleRng`] owned by the battle, so an outcome is fully
//! reproducible from its seed.
//!
//! ```
//! use battle_dispatch::core::BattleRng;
//!
//! let mut a = BattleRng::new(7);
//! let mut b = BattleRng::new(7);
//! assert_eq!(a.chance(30), b.chance(30));
//! ```

use std::hash::{Hash, Hasher};
use std::ops::Range;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Seedable battle RNG backed by ChaCha8.
///
/// The stream position is a plain counter, so a checkpoint is two integers.
#[derive(Clone, Debug)]
pub struct BattleRng {
    stream: ChaCha8Rng,
    seed: u64,
}

impl BattleRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// An independent stream derived from this seed and a label.
    ///
    /// Does not depend on how far this stream has advanced.
    #[must_use]
    pub fn for_context(&self, label: &str) -> Self {
        let mut hasher = FxHasher::default();
        (self.seed, label).hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `true` with probability `percent / 100`. 0 never succeeds, 100 and
    /// above always do, and neither of those draws from the stream.
    pub fn chance(&mut self, percent: u32) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => self.stream.gen_ratio(p, 100),
        }
    }

    /// Uniform integer in `range`.
    pub fn gen_range(&mut self, range: Range<i32>) -> i32 {
        self.stream.gen_range(range)
    }

    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.stream.gen_bool(probability)
    }

    /// A uniformly chosen element, `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, options: &'a [T]) -> Option<&'a T> {
        options.choose(&mut self.stream)
    }

    /// Checkpoint of the current position.
    #[must_use]
    pub fn state(&self) -> BattleRngState {
        BattleRngState {
            seed: self.seed,
            word_pos: self.stream.get_word_pos(),
        }
    }

    /// Resume from a checkpoint.
    #[must_use]
    pub fn from_state(state: &BattleRngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.stream.set_word_pos(state.word_pos);
        rng
    }
}

/// Serializable RNG checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRngState {
    pub seed: u64,
    /// ChaCha8 word position.
    pub word_pos: u128,
}
