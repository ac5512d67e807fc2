//! HP transitions: damage, healing and fainting.
//!
//! ## Damage order
//!
//! 1. The source's own effects (`modify_damage_dealt`), when the request
//!    has a source combatant.
//! 2. The target's gather (`modify_damage_taken`).
//! 3. HP is reduced, clamped at zero.
//! 4. `on_after_damage` to every live effect.
//! 5. If HP reached zero, the faint sequence runs: message, `on_faint` to
//!    every live effect, removal from the field, then the battle-end check.

use tracing::debug;

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{CombatantId, DamageCategory, ElementType, Interrupt, Owner, TransitionKind};
use crate::effects::{abstain, dispatch, Dispatch, Effect, EffectInstance, Hook, Message};

/// A request to reduce a combatant's HP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageRequest {
    pub target: CombatantId,
    /// Amount before any effect modifies it.
    pub amount: u32,
    /// Element of the attack, if any.
    pub element: Option<ElementType>,
    /// Set for hits from moves; indirect damage has none.
    pub category: Option<DamageCategory>,
    /// Whether the hit makes contact.
    pub contact: bool,
    pub origin: Origin,
}

impl DamageRequest {
    /// Passive, typeless damage.
    #[must_use]
    pub fn new(target: CombatantId, amount: u32) -> Self {
        Self {
            target,
            amount,
            element: None,
            category: None,
            contact: false,
            origin: Origin::passive(),
        }
    }

    /// A hit from a move used by `source` (builder pattern entry).
    #[must_use]
    pub fn hit(
        source: CombatantId,
        target: CombatantId,
        amount: u32,
        category: DamageCategory,
    ) -> Self {
        Self {
            category: Some(category),
            origin: Origin::by(source),
            ..Self::new(target, amount)
        }
    }

    /// Set the element (builder pattern).
    #[must_use]
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.element = Some(element);
        self
    }

    /// Mark as a contact hit (builder pattern).
    #[must_use]
    pub fn with_contact(mut self) -> Self {
        self.contact = true;
        self
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// The attacking combatant, if any.
    #[must_use]
    pub fn source(&self) -> Option<CombatantId> {
        self.origin.combatant
    }

    /// Whether this is a hit from a move rather than indirect damage.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.category.is_some()
    }
}

/// A request to restore a combatant's HP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealRequest {
    pub target: CombatantId,
    pub amount: u32,
    pub origin: Origin,
}

impl HealRequest {
    /// Passive healing.
    #[must_use]
    pub fn new(target: CombatantId, amount: u32) -> Self {
        Self {
            target,
            amount,
            origin: Origin::passive(),
        }
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Mediator for HP changes.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
///
/// use battle_dispatch::battle::Battle;
/// use battle_dispatch::core::{BattleConfig, Combatant, SideId};
/// use battle_dispatch::effects::EffectRegistry;
/// use battle_dispatch::handlers::{DamageHandler, DamageRequest, HealRequest};
///
/// let mut battle = Battle::new(BattleConfig::new(2), Arc::new(EffectRegistry::new()));
/// let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 50)).unwrap();
/// battle.add_combatant(Combatant::new("B", SideId::new(1), 50)).unwrap();
///
/// let hit = DamageHandler::apply(&mut battle, DamageRequest::new(a, 20)).unwrap();
/// assert_eq!(hit.magnitude, 20);
///
/// let healed = DamageHandler::heal(&mut battle, HealRequest::new(a, 100)).unwrap();
/// assert_eq!(healed.magnitude, 20);
/// assert_eq!(battle.combatant(a).unwrap().hp, 50);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DamageHandler;

impl DamageHandler {
    /// Apply damage. The magnitude is the HP actually lost.
    pub fn apply(
        battle: &mut Battle,
        request: DamageRequest,
    ) -> Result<Transition<u32>, Interrupt> {
        run::<Damage>(battle, &request)
    }

    /// Restore HP, clamped to the maximum. Fainted combatants cannot heal.
    pub fn heal(battle: &mut Battle, request: HealRequest) -> Result<Transition<u32>, Interrupt> {
        run::<Heal>(battle, &request)
    }

    /// Run the faint sequence for a combatant. A second call is a no-op.
    pub fn faint(battle: &mut Battle, target: CombatantId) -> Result<Transition<()>, Interrupt> {
        run::<Faint>(battle, &target)
    }
}

struct Damage;

impl Mediator for Damage {
    type Request = DamageRequest;
    type Value = u32;

    const KIND: TransitionKind = TransitionKind::Damage;
    const ANIMATED: bool = true;

    fn target(request: &DamageRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &DamageRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &DamageRequest) -> Result<u32, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.amount)
    }

    fn current(_battle: &Battle, _request: &DamageRequest) -> u32 {
        0
    }

    fn pre(
        battle: &mut Battle,
        request: &DamageRequest,
        initial: u32,
    ) -> Result<Dispatch<u32>, Interrupt> {
        let amount = match request.source() {
            Some(source) => {
                let offensive = battle.effects().snapshot(Owner::Combatant(source));
                let dealt = dispatch(battle, &offensive, initial, |effect, this, battle, amount| {
                    effect.modify_damage_dealt(this, battle, request, *amount)
                })?;
                match dealt {
                    Dispatch::Proceed(amount) => amount,
                    vetoed @ Dispatch::Vetoed { .. } => return Ok(vetoed),
                }
            }
            None => initial,
        };

        let defensive = battle.effects().gather_for(battle.state(), request.target);
        dispatch(battle, &defensive, amount, |effect, this, battle, amount| {
            effect.modify_damage_taken(this, battle, request, *amount)
        })
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        amount: &u32,
    ) -> Hook<u32> {
        effect.modify_damage_taken(this, battle, request, *amount)
    }

    fn apply(
        battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Result<Transition<u32>, Interrupt> {
        let target = battle.state_mut().require_mut(request.target)?;
        let dealt = amount.min(target.hp);
        if dealt == 0 {
            return Ok(Transition::unchanged(0));
        }
        target.hp -= dealt;
        Ok(Transition::applied(dealt))
    }

    fn announce(battle: &mut Battle, request: &DamageRequest, outcome: &Transition<u32>) {
        if !outcome.occurred || request.is_direct() {
            return;
        }
        if let Some(effect) = &request.origin.effect {
            let message = Message::new("hurt_by_effect")
                .subject(request.target)
                .arg(effect.as_str());
            battle.display_message(&message);
        }
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        effect.on_after_damage(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<u32>) -> i64 {
        i64::from(outcome.magnitude)
    }

    fn settle(
        battle: &mut Battle,
        request: &DamageRequest,
        _outcome: &Transition<u32>,
    ) -> Result<(), Interrupt> {
        let down = battle
            .combatant(request.target)
            .is_some_and(|c| c.is_down() && !c.fainted);
        if down {
            DamageHandler::faint(battle, request.target)?;
        }
        Ok(())
    }
}

struct Heal;

impl Mediator for Heal {
    type Request = HealRequest;
    type Value = u32;

    const KIND: TransitionKind = TransitionKind::Heal;
    const ANIMATED: bool = true;

    fn target(request: &HealRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &HealRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &HealRequest) -> Result<u32, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.amount)
    }

    fn current(_battle: &Battle, _request: &HealRequest) -> u32 {
        0
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &HealRequest,
        amount: &u32,
    ) -> Hook<u32> {
        effect.modify_heal(this, battle, request, *amount)
    }

    fn apply(
        battle: &mut Battle,
        request: &HealRequest,
        amount: u32,
    ) -> Result<Transition<u32>, Interrupt> {
        let target = battle.state_mut().require_mut(request.target)?;
        if target.fainted || target.is_down() {
            return Ok(Transition::unchanged(0));
        }
        let healed = amount.min(target.max_hp - target.hp);
        if healed == 0 {
            return Ok(Transition::unchanged(0));
        }
        target.hp += healed;
        Ok(Transition::applied(healed))
    }

    fn announce(battle: &mut Battle, request: &HealRequest, outcome: &Transition<u32>) {
        if outcome.occurred {
            let mut message = Message::new("hp_restored").subject(request.target);
            if let Some(effect) = &request.origin.effect {
                message = message.arg(effect.as_str());
            }
            battle.display_message(&message);
        }
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &HealRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        effect.on_after_heal(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<u32>) -> i64 {
        i64::from(outcome.magnitude)
    }
}

struct Faint;

impl Mediator for Faint {
    type Request = CombatantId;
    type Value = ();

    const KIND: TransitionKind = TransitionKind::Faint;
    const ANIMATED: bool = true;

    fn target(target: &CombatantId) -> Owner {
        Owner::Combatant(*target)
    }

    fn origin(_target: &CombatantId) -> &Origin {
        &PASSIVE
    }

    fn initial(battle: &Battle, target: &CombatantId) -> Result<(), Interrupt> {
        battle.state().require(*target)?;
        Ok(())
    }

    fn current(_battle: &Battle, _target: &CombatantId) {}

    /// Fainting cannot be prevented; there is no pre hook.
    fn pre(
        _battle: &mut Battle,
        _target: &CombatantId,
        initial: (),
    ) -> Result<Dispatch<()>, Interrupt> {
        Ok(Dispatch::Proceed(initial))
    }

    fn pre_hook(
        _effect: &mut dyn Effect,
        _this: &EffectInstance,
        _battle: &mut Battle,
        _target: &CombatantId,
        _value: &(),
    ) -> Hook<()> {
        abstain()
    }

    fn apply(
        battle: &mut Battle,
        target: &CombatantId,
        _value: (),
    ) -> Result<Transition<()>, Interrupt> {
        let combatant = battle.state_mut().require_mut(*target)?;
        if combatant.fainted {
            return Ok(Transition::unchanged(()));
        }
        combatant.hp = 0;
        combatant.fainted = true;
        debug!(combatant = %target, "fainted");
        Ok(Transition::applied(()))
    }

    fn announce(battle: &mut Battle, target: &CombatantId, outcome: &Transition<()>) {
        if outcome.occurred {
            battle.display_message(&Message::new("fainted").subject(*target));
        }
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        target: &CombatantId,
        _outcome: &Transition<()>,
    ) -> Hook<()> {
        effect.on_faint(this, battle, *target)
    }

    fn settle(
        battle: &mut Battle,
        target: &CombatantId,
        outcome: &Transition<()>,
    ) -> Result<(), Interrupt> {
        if !outcome.occurred {
            return Ok(());
        }
        battle.effects_mut().clear(Owner::Combatant(*target));
        let state = battle.state_mut();
        if let Some(combatant) = state.combatant_mut(*target) {
            combatant.stages.clear();
        }
        state.leave_field(*target);
        battle.check_battle_end()
    }
}

static PASSIVE: Origin = Origin {
    combatant: None,
    effect: None,
    announce: false,
};
