//! Error types.
//!
//! Two layers:
//! - [`BattleError`]: internal-consistency failures. None of these is a
//!   normal battle outcome; "but it failed!" is a veto, not an error.
//! - [`Interrupt`]: the out-of-band value that unwinds a chain of mediator
//!   calls, either because the battle ended or because of a `BattleError`.

use thiserror::Error;

use super::entity::CombatantId;
use super::side::SideId;
use crate::data::RecordKind;
use crate::effects::EffectId;
use crate::rules::BattleResult;

/// Internal-consistency failures surfaced to the turn engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BattleError {
    /// Mediator calls nested deeper than the configured cap.
    #[error("reentrant dispatch exceeded the depth limit of {limit}")]
    DispatchDepthExceeded { limit: usize },

    /// A request named a combatant this battle does not know.
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    /// A combatant was registered for a side outside the battle.
    #[error("unknown side {0}")]
    UnknownSide(SideId),

    /// A request needs the combatant on the field but it is not.
    #[error("{0} is not on the field")]
    NotActive(CombatantId),

    /// A template effect was registered without one of its required parts.
    #[error("effect {id} ({template} template) is missing its {missing}")]
    IncompleteTemplate {
        id: EffectId,
        template: &'static str,
        missing: &'static str,
    },

    /// The process-wide registry can only be installed once.
    #[error("the effect registry has already been installed")]
    RegistryAlreadyInstalled,

    /// A battle asked for the process-wide registry before installation.
    #[error("no effect registry has been installed")]
    RegistryNotInstalled,

    /// Static data has no record for this key.
    #[error("unknown {kind} record {key:?}")]
    UnknownRecord { kind: RecordKind, key: String },
}

/// Why a mediator chain stopped early.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Interrupt {
    /// The battle is over; no further dispatch runs for the current action.
    #[error("battle ended: {0}")]
    BattleEnded(BattleResult),

    /// A fatal simulation error.
    #[error(transparent)]
    Fatal(#[from] BattleError),
}

impl Interrupt {
    /// The battle result, if this interrupt is a normal battle end.
    #[must_use]
    pub fn battle_result(&self) -> Option<&BattleResult> {
        match self {
            Interrupt::BattleEnded(result) => Some(result),
            Interrupt::Fatal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BattleError::DispatchDepthExceeded { limit: 8 };
        assert_eq!(err.to_string(), "reentrant dispatch exceeded the depth limit of 8");

        let err = BattleError::IncompleteTemplate {
            id: EffectId::new("limber"),
            template: "status immunity",
            missing: "message key",
        };
        assert_eq!(
            err.to_string(),
            "effect :limber (status immunity template) is missing its message key"
        );
    }

    #[test]
    fn test_interrupt_from_error() {
        let interrupt: Interrupt = BattleError::UnknownCombatant(CombatantId(4)).into();
        assert!(interrupt.battle_result().is_none());

        let ended = Interrupt::BattleEnded(BattleResult::Winner(SideId::new(0)));
        assert_eq!(ended.battle_result(), Some(&BattleResult::Winner(SideId::new(0))));
    }
}
