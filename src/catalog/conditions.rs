//! Side and field conditions.

use crate::battle::Battle;
use crate::core::{
    CombatantId, DamageCategory, ElementType, Owner, StatusCondition, Terrain, Weather,
};
use crate::effects::{abstain, override_with, veto_with, Cue, Effect, EffectInstance, Hook, Message};
use crate::handlers::{
    DamageHandler, DamageRequest, HealRequest, Origin, StatusRequest, SwitchRequest, TerrainHandler,
    TerrainRequest, Transition, WeatherHandler, WeatherRequest,
};
use super::scale;

/// Whether `combatant` stands on the side owning `this`.
fn guards(this: &EffectInstance, battle: &Battle, combatant: CombatantId) -> bool {
    match this.owner() {
        Owner::Side(side) => battle.state().side_of(combatant) == Some(side),
        _ => false,
    }
}

/// Active combatants still standing, in switch-in order.
fn standing(battle: &Battle) -> Vec<CombatantId> {
    battle
        .state()
        .active()
        .iter()
        .copied()
        .filter(|&id| battle.combatant(id).is_some_and(|c| !c.is_down()))
        .collect()
}

// === Side ===

/// Five turns of protection from conditions inflicted by opponents.
#[derive(Clone, Copy, Debug, Default)]
pub struct Safeguard;

impl Effect for Safeguard {
    fn default_duration(&self) -> Option<u32> {
        Some(5)
    }

    fn modify_status(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        let from_opponent = request
            .origin
            .combatant
            .is_some_and(|source| battle.state().are_opponents(source, request.target));
        if status.is_some() && from_opponent && guards(this, battle, request.target) {
            veto_with([Cue::Message(Message::new("safeguard_protects").subject(request.target))])
        } else {
            abstain()
        }
    }
}

/// Five turns of halved physical damage.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reflect;

impl Effect for Reflect {
    fn default_duration(&self) -> Option<u32> {
        Some(5)
    }

    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if request.category == Some(DamageCategory::Physical)
            && guards(this, battle, request.target)
        {
            override_with(amount / 2)
        } else {
            abstain()
        }
    }
}

/// Hurts every combatant entering the side by 1/8 of its max HP.
#[derive(Clone, Copy, Debug, Default)]
pub struct StealthRock;

impl Effect for StealthRock {
    fn on_switch_in(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        if !outcome.occurred || !guards(this, battle, request.combatant) {
            return abstain();
        }
        let Some(amount) = battle.combatant(request.combatant).map(|c| c.fraction_of_max(8)) else {
            return abstain();
        };
        let hit =
            DamageRequest::new(request.combatant, amount).with_origin(Origin::from_effect(this));
        DamageHandler::apply(battle, hit)?;
        abstain()
    }
}

// === Field ===

/// Sun or rain: boosts one element by half and weakens another by half.
#[derive(Clone, Copy, Debug)]
pub struct WeatherBoost {
    boosted: ElementType,
    weakened: ElementType,
}

impl WeatherBoost {
    #[must_use]
    pub fn sun() -> Self {
        Self {
            boosted: ElementType::Fire,
            weakened: ElementType::Water,
        }
    }

    #[must_use]
    pub fn rain() -> Self {
        Self {
            boosted: ElementType::Water,
            weakened: ElementType::Fire,
        }
    }
}

impl Effect for WeatherBoost {
    fn modify_damage_taken(
        &mut self,
        _this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        match request.element {
            Some(element) if request.is_direct() && element == self.boosted => {
                override_with(scale(amount, 3, 2))
            }
            Some(element) if request.is_direct() && element == self.weakened => {
                override_with(amount / 2)
            }
            _ => abstain(),
        }
    }

    fn on_expire(&mut self, _this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        WeatherHandler::apply(battle, WeatherRequest::clear())?;
        abstain()
    }
}

const SAND_PROOF: [ElementType; 3] = [ElementType::Rock, ElementType::Ground, ElementType::Steel];

/// 1/16 max HP per turn to everyone except rock, ground and steel types.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sandstorm;

impl Effect for Sandstorm {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        for id in standing(battle) {
            let amount = match battle.combatant(id) {
                Some(c) if !SAND_PROOF.iter().any(|&t| c.has_type(t)) => c.fraction_of_max(16),
                _ => continue,
            };
            let hit = DamageRequest::new(id, amount).with_origin(Origin::from_effect(this));
            DamageHandler::apply(battle, hit)?;
        }
        abstain()
    }

    fn on_expire(&mut self, _this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        if battle.state().field.weather == Some(Weather::Sandstorm) {
            WeatherHandler::apply(battle, WeatherRequest::clear())?;
        }
        abstain()
    }
}

/// Terrain effects share their expiry.
fn end_terrain(battle: &mut Battle, terrain: Terrain) -> Hook<()> {
    if battle.state().field.terrain == Some(terrain) {
        TerrainHandler::apply(battle, TerrainRequest::clear())?;
    }
    abstain()
}

/// Nobody falls asleep; electric attacks hit 30% harder.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElectricTerrain;

impl Effect for ElectricTerrain {
    fn modify_status(
        &mut self,
        _this: &EffectInstance,
        _battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        if status == Some(StatusCondition::Sleep) {
            let message = Message::new("terrain_prevents_sleep").subject(request.target);
            veto_with([Cue::Message(message)])
        } else {
            abstain()
        }
    }

    fn modify_damage_taken(
        &mut self,
        _this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if request.is_direct() && request.element == Some(ElementType::Electric) {
            override_with(scale(amount, 13, 10))
        } else {
            abstain()
        }
    }

    fn on_expire(&mut self, _this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        end_terrain(battle, Terrain::Electric)
    }
}

/// Restores 1/16 max HP to everyone at the end of each turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrassyTerrain;

impl Effect for GrassyTerrain {
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        for id in standing(battle) {
            let amount = match battle.combatant(id) {
                Some(c) if c.hp < c.max_hp => c.fraction_of_max(16),
                _ => continue,
            };
            let heal = HealRequest::new(id, amount).with_origin(Origin::from_effect(this));
            DamageHandler::heal(battle, heal)?;
        }
        abstain()
    }

    fn on_expire(&mut self, _this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        end_terrain(battle, Terrain::Grassy)
    }
}

/// Protects everyone from non-volatile conditions.
#[derive(Clone, Copy, Debug, Default)]
pub struct MistyTerrain;

impl Effect for MistyTerrain {
    fn modify_status(
        &mut self,
        _this: &EffectInstance,
        _battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        if status.is_some() {
            veto_with([Cue::Message(Message::new("terrain_protects").subject(request.target))])
        } else {
            abstain()
        }
    }

    fn on_expire(&mut self, _this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        end_terrain(battle, Terrain::Misty)
    }
}
