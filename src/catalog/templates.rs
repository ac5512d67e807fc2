//! Shared-algorithm families.
//!
//! Several abilities run the same rule with different data ("prevent
//! these stat drops", "prevent these conditions"). Each family is one
//! effect type built from its data, validated when the registry is built.

use smallvec::SmallVec;

use crate::battle::Battle;
use crate::core::{BattleError, Stat, StatusCondition};
use crate::effects::{abstain, announced_veto, Effect, EffectId, EffectInstance, Hook, Message};
use crate::handlers::{
    Origin, StatChangeRequest, StatusHandler, StatusRequest, SwitchRequest, Transition,
};

/// Blocks stat drops caused by opponents.
///
/// Only the holder is protected, and only for the listed stats. Self-inflicted
/// drops go through.
#[derive(Clone, Debug)]
pub struct StatLossGuard {
    stats: SmallVec<[Stat; 7]>,
}

impl StatLossGuard {
    /// Fails when no stat is listed.
    pub fn new(id: &EffectId, stats: &[Stat]) -> Result<Self, BattleError> {
        if stats.is_empty() {
            return Err(BattleError::IncompleteTemplate {
                id: id.clone(),
                template: "stat loss guard",
                missing: "stats",
            });
        }
        Ok(Self {
            stats: stats.iter().copied().collect(),
        })
    }

    /// Guard every stat.
    pub fn all(id: &EffectId) -> Result<Self, BattleError> {
        Self::new(id, &Stat::ALL)
    }
}

impl Effect for StatLossGuard {
    fn modify_stat_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        delta: i8,
    ) -> Hook<i8> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if holder != request.target || delta >= 0 || !self.stats.contains(&request.stat) {
            return abstain();
        }
        if !request.is_from_opponent(battle) {
            return abstain();
        }
        let message = Message::new("stat_loss_prevented")
            .subject(holder)
            .arg(request.stat.key());
        announced_veto(holder, this.id(), message)
    }
}

/// Blocks a set of non-volatile conditions.
///
/// With `affects_allies` the holder's allies on the field are protected
/// too. A holder that somehow already has one of the conditions is cured
/// when it enters the field.
#[derive(Clone, Debug)]
pub struct StatusImmunity {
    conditions: SmallVec<[StatusCondition; 2]>,
    message: &'static str,
    affects_allies: bool,
}

impl StatusImmunity {
    /// Fails when no condition or no message key is given.
    pub fn new(
        id: &EffectId,
        conditions: &[StatusCondition],
        message: &'static str,
    ) -> Result<Self, BattleError> {
        let missing = if conditions.is_empty() {
            Some("conditions")
        } else if message.is_empty() {
            Some("message key")
        } else {
            None
        };
        if let Some(missing) = missing {
            return Err(BattleError::IncompleteTemplate {
                id: id.clone(),
                template: "status immunity",
                missing,
            });
        }
        Ok(Self {
            conditions: conditions.iter().copied().collect(),
            message,
            affects_allies: false,
        })
    }

    /// Extend the protection to allies (builder pattern).
    #[must_use]
    pub fn for_allies(mut self) -> Self {
        self.affects_allies = true;
        self
    }

    /// Whether `condition` is blocked.
    #[must_use]
    pub fn blocks(&self, condition: StatusCondition) -> bool {
        self.conditions.contains(&condition)
    }
}

impl Effect for StatusImmunity {
    fn affects_allies(&self) -> bool {
        self.affects_allies
    }

    fn modify_status(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        match status {
            Some(condition) if self.blocks(condition) => {
                let message = Message::new(self.message).subject(request.target);
                announced_veto(holder, this.id(), message)
            }
            _ => abstain(),
        }
    }

    fn on_switch_in(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        if !outcome.occurred || this.holder() != Some(request.combatant) {
            return abstain();
        }
        let afflicted = battle
            .combatant(request.combatant)
            .and_then(|c| c.status)
            .is_some_and(|condition| self.blocks(condition));
        if afflicted {
            let cure = StatusRequest::cure(request.combatant)
                .with_origin(Origin::from_effect(this).announced());
            StatusHandler::apply(battle, cure)?;
        }
        abstain()
    }
}
