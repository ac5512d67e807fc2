//! Core battle types: identifiers, sides, state, vocabulary, RNG,
//! configuration and errors.
//!
//! Nothing in here knows about individual effects. The effect machinery in
//! [`crate::effects`] and the mediators in [`crate::handlers`] build on it.

pub mod entity;
pub mod side;
pub mod stats;
pub mod rng;
pub mod config;
pub mod error;
pub mod state;

pub use entity::{CombatantId, Owner};
pub use side::{SideId, SideMap};
pub use stats::{DamageCategory, ElementType, Stat, StatStages, StatusCondition, Terrain, Weather};
pub use rng::{BattleRng, BattleRngState};
pub use config::BattleConfig;
pub use error::{BattleError, Interrupt};
pub use state::{BattleState, Combatant, FieldState, TransitionKind, TransitionRecord};
