//! Abilities with their own rules. Template-based abilities are built in
//! [`super::templates`].

use crate::battle::Battle;
use crate::core::{ElementType, Stat, StatusCondition, Terrain, Weather};
use crate::effects::{
    abstain, announced_veto, override_with, veto, veto_with, Cue, Effect, EffectId, EffectInstance,
    Hook, Message,
};
use crate::handlers::{
    AttachRequest, DamageHandler, DamageRequest, HealRequest, ItemRequest, Origin,
    StatChangeRequest, StatHandler, StatusHandler, StatusRequest, SwitchRequest, TerrainHandler,
    TerrainRequest, Transition, WeatherHandler, WeatherRequest,
};
use super::scale;

pub(crate) const LEVITATE: EffectId = EffectId::new("levitate");
pub(crate) const FLINCH: EffectId = EffectId::new("flinch");

/// Lowers the attack of every opponent on the field when the holder
/// switches in. Each drop is its own stat transition, so each opponent's
/// effects can block it independently.
#[derive(Clone, Copy, Debug, Default)]
pub struct Intimidate;

impl Effect for Intimidate {
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
        for opponent in battle.state().opponents_of(request.combatant) {
            let drop = StatChangeRequest::new(opponent, Stat::Attack, -1)
                .with_origin(Origin::from_effect(this).announced());
            StatHandler::apply(battle, drop)?;
        }
        abstain()
    }
}

/// Absorbs fire attacks and powers up the holder's own fire attacks
/// afterwards. The boost lasts until the holder leaves the field.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlashFire {
    boosted: bool,
}

impl Effect for FlashFire {
    fn is_activated(&self) -> bool {
        self.boosted
    }

    fn modify_damage_dealt(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        if self.boosted
            && request.source() == this.holder()
            && request.element == Some(ElementType::Fire)
        {
            override_with(scale(amount, 3, 2))
        } else {
            abstain()
        }
    }

    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        _amount: u32,
    ) -> Hook<u32> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if holder != request.target || request.element != Some(ElementType::Fire) {
            return abstain();
        }
        self.boosted = true;
        announced_veto(holder, this.id(), Message::new("fire_power_rose").subject(holder))
    }
}

/// Hurts attackers that make contact by 1/8 of their max HP, once per
/// action.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoughSkin {
    fired: bool,
}

impl Effect for RoughSkin {
    fn on_action_start(&mut self, _this: &EffectInstance, _battle: &mut Battle) -> Hook<()> {
        self.fired = false;
        abstain()
    }

    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        if self.fired
            || !outcome.occurred
            || !request.contact
            || this.holder() != Some(request.target)
        {
            return abstain();
        }
        let Some(attacker) = request.source().filter(|&s| s != request.target) else {
            return abstain();
        };
        let Some(amount) = battle
            .combatant(attacker)
            .filter(|c| !c.is_down())
            .map(|c| c.fraction_of_max(8))
        else {
            return abstain();
        };
        self.fired = true;
        let recoil =
            DamageRequest::new(attacker, amount).with_origin(Origin::from_effect(this).announced());
        DamageHandler::apply(battle, recoil)?;
        abstain()
    }
}

/// 30% chance to paralyze an attacker that makes contact.
#[derive(Clone, Copy, Debug, Default)]
pub struct Static;

impl Effect for Static {
    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        if !outcome.occurred || !request.contact || this.holder() != Some(request.target) {
            return abstain();
        }
        let Some(attacker) = request.source().filter(|&s| s != request.target) else {
            return abstain();
        };
        if battle.rng().chance(30) {
            let paralyze = StatusRequest::inflict(attacker, StatusCondition::Paralysis)
                .with_origin(Origin::from_effect(this).announced());
            StatusHandler::apply(battle, paralyze)?;
        }
        abstain()
    }
}

/// Sharply raises attack whenever an opponent lowers one of the holder's
/// stats.
#[derive(Clone, Copy, Debug, Default)]
pub struct Defiant;

impl Effect for Defiant {
    fn on_after_stat_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        outcome: &Transition<i8>,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if !outcome.occurred
            || outcome.magnitude >= 0
            || holder != request.target
            || !request.is_from_opponent(battle)
        {
            return abstain();
        }
        let boost = StatChangeRequest::new(holder, Stat::Attack, 2)
            .with_origin(Origin::from_effect(this).announced());
        StatHandler::apply(battle, boost)?;
        abstain()
    }
}

/// Copies an opponent's stat increase, once per action.
#[derive(Clone, Copy, Debug, Default)]
pub struct Opportunist {
    fired: bool,
}

impl Effect for Opportunist {
    fn on_action_start(&mut self, _this: &EffectInstance, _battle: &mut Battle) -> Hook<()> {
        self.fired = false;
        abstain()
    }

    fn on_after_stat_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        outcome: &Transition<i8>,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if self.fired || !outcome.occurred || outcome.magnitude <= 0 {
            return abstain();
        }
        if !battle.state().are_opponents(holder, request.target)
            || !battle.state().is_active(holder)
        {
            return abstain();
        }
        self.fired = true;
        let copy = StatChangeRequest::new(holder, request.stat, outcome.magnitude)
            .with_origin(Origin::from_effect(this).announced());
        StatHandler::apply(battle, copy)?;
        abstain()
    }
}

/// What a field-setting ability puts in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSetting {
    Weather(Weather),
    Terrain(Terrain),
}

/// Sets weather or terrain when the holder switches in (drought, drizzle,
/// electric surge).
#[derive(Clone, Copy, Debug)]
pub struct SetsField {
    setting: FieldSetting,
}

impl SetsField {
    #[must_use]
    pub fn new(setting: FieldSetting) -> Self {
        Self { setting }
    }
}

impl Effect for SetsField {
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
        let origin = Origin::from_effect(this).announced();
        match self.setting {
            FieldSetting::Weather(weather) => {
                WeatherHandler::apply(battle, WeatherRequest::set(weather).with_origin(origin))?;
            }
            FieldSetting::Terrain(terrain) => {
                TerrainHandler::apply(battle, TerrainRequest::set(terrain).with_origin(origin))?;
            }
        }
        abstain()
    }
}

/// Cures the holder's status as it leaves the field.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalCure;

impl Effect for NaturalCure {
    fn on_switch_out(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        if !outcome.occurred || this.holder() != Some(request.combatant) {
            return abstain();
        }
        let afflicted = battle.combatant(request.combatant).is_some_and(|c| c.status.is_some());
        if afflicted {
            let cure = StatusRequest::cure(request.combatant)
                .with_origin(Origin::from_effect(this).announced());
            StatusHandler::apply(battle, cure)?;
        }
        abstain()
    }
}

/// Opponents cannot take or swap the holder's item.
#[derive(Clone, Copy, Debug, Default)]
pub struct StickyHold;

impl Effect for StickyHold {
    fn modify_item_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &ItemRequest,
        _item: Option<&EffectId>,
    ) -> Hook<Option<EffectId>> {
        match this.holder() {
            Some(holder) if holder == request.target && request.is_from_opponent(battle) => {
                announced_veto(holder, this.id(), Message::new("item_held_fast").subject(holder))
            }
            _ => abstain(),
        }
    }
}

/// The holder never flinches.
#[derive(Clone, Copy, Debug, Default)]
pub struct InnerFocus;

impl Effect for InnerFocus {
    fn on_before_attach(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &AttachRequest,
    ) -> Hook<()> {
        match this.holder() {
            Some(holder) if request.owner == this.owner() && request.effect == FLINCH => {
                announced_veto(holder, this.id(), Message::new("wont_flinch").subject(holder))
            }
            _ => abstain(),
        }
    }
}

/// Ground attacks miss the holder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Levitate;

impl Effect for Levitate {
    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        _battle: &mut Battle,
        request: &DamageRequest,
        _amount: u32,
    ) -> Hook<u32> {
        match this.holder() {
            Some(holder)
                if holder == request.target && request.element == Some(ElementType::Ground) =>
            {
                announced_veto(holder, this.id(), Message::new("no_effect").subject(holder))
            }
            _ => abstain(),
        }
    }
}

/// Water attacks heal the holder by 1/4 of its max HP instead of hurting
/// it.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaterAbsorb;

impl Effect for WaterAbsorb {
    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        _amount: u32,
    ) -> Hook<u32> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if holder != request.target || request.element != Some(ElementType::Water) {
            return abstain();
        }
        let amount = battle.combatant(holder).map_or(0, |c| c.fraction_of_max(4));
        let heal =
            HealRequest::new(holder, amount).with_origin(Origin::from_effect(this).announced());
        if DamageHandler::heal(battle, heal)?.occurred {
            veto()
        } else {
            announced_veto(holder, this.id(), Message::new("no_effect").subject(holder))
        }
    }
}

/// Opponents on the ground cannot switch out voluntarily.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArenaTrap;

impl Effect for ArenaTrap {
    fn on_before_switch_out(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
    ) -> Hook<()> {
        let Some(holder) = this.holder() else {
            return abstain();
        };
        if !battle.state().are_opponents(holder, request.combatant) {
            return abstain();
        }
        let grounded = battle
            .combatant(request.combatant)
            .is_some_and(|c| !c.has_type(ElementType::Flying) && c.ability != LEVITATE);
        if !grounded {
            return abstain();
        }
        veto_with([
            Cue::indicator(holder, this.id().clone()),
            Cue::Message(Message::new("cannot_escape").subject(request.combatant)),
        ])
    }
}
