//! # battle-dispatch
//!
//! The rule-dispatch core of a turn-based creature battle.
//!
//! Hundreds of independently written effects (abilities, held items,
//! status conditions, side and field conditions) watch a shared stream of
//! battle-state transitions. Each may veto a transition, rewrite its
//! value, or react once it has happened, without the core knowing any
//! specific rule.
//!
//! ## Design Principles
//!
//! 1. **One path per transition**: every change to HP, stat stages,
//!    status, the lineup, items, abilities, weather and terrain goes
//!    through its mediator in [`handlers`]. Effects never write state
//!    directly; they issue mediator requests.
//!
//! 2. **Explicit context**: a [`Battle`] is passed into every mediator and
//!    hook. There is no global "current battle", so battles can run side by
//!    side.
//!
//! 3. **Deterministic**: dispatch order is fixed (own container first, then
//!    allies, side and field, ties by insertion order) and every
//!    probability check draws from the battle's seeded RNG.
//!
//! ## Modules
//!
//! - `core`: ids, sides, battle state, vocabulary, RNG, configuration, errors
//! - `data`: static data records
//! - `effects`: the `Effect` trait, instances, containers, dispatch, registry
//! - `handlers`: the mediator family
//! - `battle`: the battle context, presentation and turn boundaries
//! - `rules`: battle results and the turn-engine collaborator
//! - `catalog`: concrete effects and the standard registry

pub mod battle;
pub mod catalog;
pub mod core;
pub mod data;
pub mod effects;
pub mod handlers;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    BattleConfig, BattleError, BattleRng, BattleState, Combatant, CombatantId, Interrupt, Owner,
    SideId,
};

pub use crate::battle::{Battle, NullPresenter, PresentationCall, Presenter, RecordingPresenter};

pub use crate::effects::{
    Effect, EffectContainer, EffectHandle, EffectId, EffectInstance, EffectRegistry, Hook,
    HookResult, Message,
};

pub use crate::handlers::{Origin, Transition};

pub use crate::catalog::{standard_data, standard_registry};

pub use crate::rules::{BattleResult, TurnEngine};
