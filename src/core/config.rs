//! Battle configuration.
//!
//! The embedding turn engine builds a `BattleConfig` before a battle starts.
//! Nothing here is read from disk; formats that want file-driven settings
//! deserialize it themselves.

use serde::{Deserialize, Serialize};

/// Engine-level settings for one battle.
///
/// ## Example
///
/// ```
/// use battle_dispatch::core::BattleConfig;
///
/// let config = BattleConfig::new(2)
///     .with_seed(99)
///     .with_max_dispatch_depth(16);
///
/// assert_eq!(config.side_count, 2);
/// assert_eq!(config.max_dispatch_depth, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Number of sides (banks) in the battle.
    pub side_count: usize,

    /// Seed for the battle RNG.
    pub seed: u64,

    /// Maximum nesting of mediator calls before the battle is aborted.
    ///
    /// Reaching it means two or more effects keep reacting to each other;
    /// that is a fatal simulation error, never a silent truncation.
    pub max_dispatch_depth: usize,

    /// Absolute bound of a stat stage.
    pub stage_limit: i8,
}

impl BattleConfig {
    /// Create a configuration with defaults for the given side count.
    #[must_use]
    pub fn new(side_count: usize) -> Self {
        Self {
            side_count,
            ..Self::default()
        }
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the reentrant dispatch cap (builder pattern).
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }

    /// Set the stat stage bound (builder pattern).
    #[must_use]
    pub fn with_stage_limit(mut self, limit: i8) -> Self {
        self.stage_limit = limit;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            side_count: 2,
            seed: 0,
            max_dispatch_depth: 64,
            stage_limit: 6,
        }
    }
}
