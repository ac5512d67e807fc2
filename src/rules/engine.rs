//! Battle outcome and the turn-engine collaborator.
//!
//! The dispatch core never chooses turn order. A `TurnEngine` supplies the
//! order and performs each top-level action by calling mediators; the
//! provided `play_turn` wires those pieces to the battle's action and
//! end-of-turn boundaries.

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::core::{BattleError, CombatantId, Interrupt, SideId};

/// Result of a finished battle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleResult {
    /// One side still stands.
    Winner(SideId),
    /// Every side was defeated at once.
    Draw,
    /// A side ran away.
    Fled(SideId),
}

impl BattleResult {
    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: SideId) -> bool {
        matches!(self, BattleResult::Winner(winner) if *winner == side)
    }
}

impl std::fmt::Display for BattleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleResult::Winner(side) => write!(f, "{side} wins"),
            BattleResult::Draw => write!(f, "draw"),
            BattleResult::Fled(side) => write!(f, "{side} fled"),
        }
    }
}

/// Turn-engine trait.
///
/// Implementations decide who acts and what each action does. Actions
/// change state only through the mediators in [`crate::handlers`].
///
/// ## Implementation Notes
///
/// - `action_order`: combatants in the order they act this turn; the same
///   order is used for end-of-turn residuals
/// - `perform`: one top-level action; propagate mediator interrupts with `?`
pub trait TurnEngine {
    /// Acting order for the current turn.
    fn action_order(&mut self, battle: &Battle) -> Vec<CombatantId>;

    /// Perform the action of one combatant.
    fn perform(&mut self, battle: &mut Battle, actor: CombatantId) -> Result<(), Interrupt>;

    // === Convenience Methods ===

    /// Play one full turn: every action in order, then end-of-turn.
    ///
    /// Returns `Ok(Some(result))` once the battle has ended. Combatants that
    /// left the field before their action are skipped.
    fn play_turn(&mut self, battle: &mut Battle) -> Result<Option<BattleResult>, BattleError> {
        if let Some(result) = battle.result() {
            return Ok(Some(result.clone()));
        }

        let order = self.action_order(battle);
        for &actor in &order {
            if !battle.state().is_active(actor) {
                continue;
            }
            let performed = battle
                .begin_action()
                .and_then(|()| self.perform(battle, actor));
            if let Some(result) = settle(performed)? {
                return Ok(Some(result));
            }
        }

        let remaining: Vec<CombatantId> = order
            .into_iter()
            .filter(|&id| battle.state().is_active(id))
            .collect();
        settle(battle.end_of_turn(&remaining))
    }
}

/// Split an interrupt into a normal battle end and a fatal error.
pub fn settle(outcome: Result<(), Interrupt>) -> Result<Option<BattleResult>, BattleError> {
    match outcome {
        Ok(()) => Ok(None),
        Err(Interrupt::BattleEnded(result)) => Ok(Some(result)),
        Err(Interrupt::Fatal(error)) => Err(error),
    }
}
