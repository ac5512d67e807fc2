//! Status conditions: the non-volatile six and the volatile flinch.
//!
//! A non-volatile condition is attached by the status mediator and lives in
//! the holder's container for as long as `Combatant::status` names it.

use crate::battle::Battle;
use crate::core::{DamageCategory, ElementType};
use crate::effects::{abstain, override_with, Effect, EffectInstance, Hook};
use crate::handlers::{
    DamageHandler, DamageRequest, Origin, StatusHandler, StatusRequest, Transition,
};
use super::scale;

/// Residual damage as a fraction of the holder's max HP.
fn residual_damage(this: &EffectInstance, battle: &mut Battle, divisor: u32) -> Hook<()> {
    let Some(holder) = this.holder() else {
        return abstain();
    };
    let amount = match battle.combatant(holder) {
        Some(c) if !c.is_down() => c.fraction_of_max(divisor),
        _ => return abstain(),
    };
    let hit = DamageRequest::new(holder, amount).with_origin(Origin::from_effect(this));
    DamageHandler::apply(battle, hit)?;
    abstain()
}

fn cure_holder(this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
    if let Some(holder) = this.holder() {
        let cure = StatusRequest::cure(holder).with_origin(Origin::from_effect(this));
        StatusHandler::apply(battle, cure)?;
    }
    abstain()
}

/// 1/16 max HP per turn; halves the holder's physical damage.
#[derive(Clone, Copy, Debug, Default)]
pub struct Burn;

impl Effect for Burn {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        residual_damage(this, battle, 16)
    }

    fn modify_damage_dealt(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if request.source() == this.holder() && request.category == Some(DamageCategory::Physical) {
            override_with(amount / 2)
        } else {
            abstain()
        }
    }
}

/// 1/8 max HP per turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct Poison;

impl Effect for Poison {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        residual_damage(this, battle, 8)
    }
}

/// n/16 max HP on the n-th turn, capped at 15/16.
#[derive(Clone, Copy, Debug)]
pub struct Toxic {
    turns: u32,
}

impl Default for Toxic {
    fn default() -> Self {
        Self { turns: 1 }
    }
}

impl Effect for Toxic {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        let amount = match battle.combatant(holder) {
            Some(c) if !c.is_down() => scale(c.max_hp, self.turns, 16).max(1),
            _ => return abstain(),
        };
        self.turns = (self.turns + 1).min(15);
        let hit = DamageRequest::new(holder, amount).with_origin(Origin::from_effect(this));
        DamageHandler::apply(battle, hit)?;
        abstain()
    }
}

/// Whether the holder can act is the turn engine's call; it reads
/// `Combatant::status`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Paralysis;

impl Effect for Paralysis {}

/// Lasts one to three turns, drawn from the battle RNG the first time the
/// countdown is needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sleep {
    turns_left: Option<u32>,
}

impl Effect for Sleep {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        let turns = match self.turns_left {
            Some(turns) => turns,
            None => u32::try_from(battle.rng().gen_range(1..4)).unwrap_or(1),
        };
        let left = turns.saturating_sub(1);
        self.turns_left = Some(left);
        if left == 0 {
            return cure_holder(this, battle);
        }
        abstain()
    }
}

/// 20% chance to thaw each turn; a fire hit thaws immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Freeze;

impl Effect for Freeze {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        if battle.rng().chance(20) {
            return cure_holder(this, battle);
        }
        abstain()
    }

    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        let thawed = outcome.occurred
            && this.holder() == Some(request.target)
            && request.element == Some(ElementType::Fire)
            && battle.combatant(request.target).is_some_and(|c| !c.is_down());
        if thawed {
            return cure_holder(this, battle);
        }
        abstain()
    }
}

/// Volatile; gone at the end of the turn it was attached in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flinch;

impl Effect for Flinch {
    fn default_duration(&self) -> Option<u32> {
        Some(1)
    }
}
