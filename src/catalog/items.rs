//! Held items.

use crate::battle::Battle;
use crate::effects::{
    abstain, announced_veto, override_with, Effect, EffectId, EffectInstance, Hook, Message,
};
use crate::handlers::{
    AbilityRequest, DamageHandler, DamageRequest, HealRequest, ItemHandler, ItemRequest, Origin,
    Transition,
};
use super::scale;

/// Restores 1/16 of max HP at the end of every turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct Leftovers;

impl Effect for Leftovers {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        let amount = match battle.combatant(holder) {
            Some(c) if !c.is_down() && c.hp < c.max_hp => c.fraction_of_max(16),
            _ => return abstain(),
        };
        let heal =
            HealRequest::new(holder, amount).with_origin(Origin::from_effect(this).announced());
        DamageHandler::heal(battle, heal)?;
        abstain()
    }
}

/// Eaten after a hit leaves the holder at half HP or less: restores 1/4 of
/// max HP.
#[derive(Clone, Copy, Debug, Default)]
pub struct SitrusBerry;

impl Effect for SitrusBerry {
    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if !outcome.occurred || holder != request.target {
            return abstain();
        }
        let amount = match battle.combatant(holder) {
            Some(c) if !c.is_down() && c.hp <= c.max_hp / 2 => c.fraction_of_max(4),
            _ => return abstain(),
        };
        let origin = Origin::from_effect(this).announced();
        DamageHandler::heal(battle, HealRequest::new(holder, amount).with_origin(origin.clone()))?;
        ItemHandler::apply(battle, ItemRequest::consume(holder).with_origin(origin))?;
        abstain()
    }
}

/// At full HP, a hit that would knock the holder out leaves it at 1 HP
/// instead. Used up when it does.
#[derive(Clone, Copy, Debug, Default)]
pub struct FocusSash {
    holding_on: bool,
}

impl Effect for FocusSash {
    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if this.holder() != Some(request.target) {
            return abstain();
        }
        match battle.combatant(request.target) {
            Some(c) if c.hp == c.max_hp && c.hp > 1 && amount >= c.hp => {
                self.holding_on = true;
                override_with(c.hp - 1)
            }
            _ => abstain(),
        }
    }

    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        _outcome: &Transition<u32>,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if !self.holding_on || holder != request.target {
            return abstain();
        }
        self.holding_on = false;
        let spend = ItemRequest::consume(holder).with_origin(Origin::from_effect(this).announced());
        ItemHandler::apply(battle, spend)?;
        abstain()
    }
}

/// Boosts the holder's direct hits by 30%, at the cost of 1/10 max HP per
/// hit that lands.
#[derive(Clone, Copy, Debug, Default)]
pub struct LifeOrb;

impl Effect for LifeOrb {
    fn modify_damage_dealt(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if request.is_direct() && request.source() == this.holder() {
            override_with(scale(amount, 13, 10))
        } else {
            abstain()
        }
    }

    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if !outcome.occurred
            || !request.is_direct()
            || request.source() != Some(holder)
            || request.target == holder
        {
            return abstain();
        }
        let amount = match battle.combatant(holder) {
            Some(c) if !c.is_down() => c.fraction_of_max(10),
            _ => return abstain(),
        };
        let hit = DamageRequest::new(holder, amount).with_origin(Origin::from_effect(this));
        DamageHandler::apply(battle, hit)?;
        abstain()
    }
}

/// The holder's ability cannot be replaced.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbilityShield;

impl Effect for AbilityShield {
    fn modify_ability_change(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &AbilityRequest,
        _ability: &EffectId,
    ) -> Hook<EffectId> {
        match this.holder() {
            Some(holder) if holder == request.target => {
                announced_veto(holder, this.id(), Message::new("ability_protected").subject(holder))
            }
            _ => abstain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::RecordingPresenter;
    use crate::catalog::standard_registry;
    use crate::core::{BattleConfig, Combatant, CombatantId, DamageCategory, Owner, SideId};
    use crate::handlers::{AbilityHandler, SwitchHandler};

    fn battle() -> (Battle, RecordingPresenter) {
        let recorder = RecordingPresenter::new();
        let registry = Arc::new(standard_registry().unwrap());
        let battle = Battle::new(BattleConfig::new(2), registry).with_presenter(recorder.clone());
        (battle, recorder)
    }

    fn enter(battle: &mut Battle, combatant: Combatant) -> CombatantId {
        let id = battle.add_combatant(combatant).unwrap();
        SwitchHandler::switch_in(battle, id).unwrap();
        id
    }

    #[test]
    fn test_leftovers_residual() {
        let (mut battle, _) = battle();
        let holder = enter(
            &mut battle,
            Combatant::new("Holder", SideId::new(0), 160).with_item("leftovers").with_hp(100),
        );
        enter(&mut battle, Combatant::new("Foe", SideId::new(1), 100));

        battle.end_of_turn(&[holder]).unwrap();
        assert_eq!(battle.combatant(holder).unwrap().hp, 110);
    }

    #[test]
    fn test_sitrus_berry_eaten_once() {
        let (mut battle, recorder) = battle();
        let holder = enter(
            &mut battle,
            Combatant::new("Holder", SideId::new(0), 100).with_item("sitrus_berry"),
        );
        enter(&mut battle, Combatant::new("Foe", SideId::new(1), 100));
        recorder.clear();

        DamageHandler::apply(&mut battle, DamageRequest::new(holder, 30)).unwrap();
        assert_eq!(battle.combatant(holder).unwrap().hp, 70);

        DamageHandler::apply(&mut battle, DamageRequest::new(holder, 30)).unwrap();
        assert_eq!(battle.combatant(holder).unwrap().hp, 65);
        assert_eq!(battle.combatant(holder).unwrap().item, None);
        assert!(!battle.has_effect(Owner::Combatant(holder), &EffectId::new("sitrus_berry")));
        assert_eq!(recorder.message_keys(), vec!["hp_restored", "item_consumed"]);

        DamageHandler::apply(&mut battle, DamageRequest::new(holder, 30)).unwrap();
        assert_eq!(battle.combatant(holder).unwrap().hp, 35);
    }

    #[test]
    fn test_focus_sash_holds_on() {
        let (mut battle, _) = battle();
        let holder = enter(
            &mut battle,
            Combatant::new("Holder", SideId::new(0), 50).with_item("focus_sash"),
        );
        let foe = enter(&mut battle, Combatant::new("Foe", SideId::new(1), 50));

        let hit = DamageRequest::hit(foe, holder, 200, DamageCategory::Physical);
        let outcome = DamageHandler::apply(&mut battle, hit.clone()).unwrap();
        assert_eq!(outcome.magnitude, 49);
        assert_eq!(battle.combatant(holder).unwrap().item, None);

        DamageHandler::apply(&mut battle, hit).unwrap_err();
        assert!(battle.combatant(holder).unwrap().fainted);
    }

    #[test]
    fn test_life_orb_boost_and_recoil() {
        let (mut battle, _) = battle();
        let holder = enter(
            &mut battle,
            Combatant::new("Holder", SideId::new(0), 100).with_item("life_orb"),
        );
        let foe = enter(&mut battle, Combatant::new("Foe", SideId::new(1), 100));

        let hit = DamageRequest::hit(holder, foe, 20, DamageCategory::Special);
        let outcome = DamageHandler::apply(&mut battle, hit).unwrap();
        assert_eq!(outcome.magnitude, 26);
        assert_eq!(battle.combatant(holder).unwrap().hp, 90);
    }

    #[test]
    fn test_ability_shield() {
        let (mut battle, recorder) = battle();
        let holder = enter(
            &mut battle,
            Combatant::new("Holder", SideId::new(0), 100)
                .with_ability("levitate")
                .with_item("ability_shield"),
        );
        recorder.clear();

        let swap = AbilityRequest::new(holder, "insomnia");
        let outcome = AbilityHandler::apply(&mut battle, swap).unwrap();
        assert!(!outcome.occurred);
        assert_eq!(outcome.magnitude, EffectId::new("levitate"));
        assert_eq!(recorder.indicators(), vec![(holder, EffectId::new("ability_shield"))]);
    }
}
