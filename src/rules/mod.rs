//! Battle outcome and turn-engine trait.
//!
//! Embedders implement `TurnEngine` to define:
//! - Who acts, and in which order
//! - What each action does, expressed as mediator calls
//!
//! The dispatch core calls into neither directly; it only reports the
//! `BattleResult` once a side has won, drawn or fled.

pub mod engine;

pub use engine::{settle, BattleResult, TurnEngine};
