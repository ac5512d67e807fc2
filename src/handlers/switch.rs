//! Entering and leaving the field.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{BattleError, CombatantId, Interrupt, Owner, TransitionKind};
use crate::effects::{abstain, dispatch, Dispatch, Effect, EffectId, EffectInstance, Hook, Message};

/// A combatant entering or leaving the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchRequest {
    pub combatant: CombatantId,
    /// Forced switches (fainting replacements, drag-out moves) skip the
    /// trapping check.
    pub forced: bool,
    pub origin: Origin,
}

impl SwitchRequest {
    /// A voluntary switch.
    #[must_use]
    pub fn new(combatant: CombatantId) -> Self {
        Self {
            combatant,
            forced: false,
            origin: Origin::by(combatant),
        }
    }

    /// A switch the combatant cannot refuse.
    #[must_use]
    pub fn forced(combatant: CombatantId) -> Self {
        Self {
            forced: true,
            ..Self::new(combatant)
        }
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Mediator for switching.
///
/// Switching in attaches the combatant's ability, then its held item, then
/// the effect of its non-volatile status, then tells everyone. Switching
/// out may be trapped; once it goes through, the combatant's stat stages
/// and container are cleared, which resets every volatile condition and
/// one-shot flag it had.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwitchHandler;

impl SwitchHandler {
    /// Put a benched combatant on the field.
    pub fn switch_in(
        battle: &mut Battle,
        combatant: CombatantId,
    ) -> Result<Transition<()>, Interrupt> {
        run::<SwitchIn>(battle, &SwitchRequest::forced(combatant))
    }

    /// Take an active combatant off the field.
    pub fn switch_out(
        battle: &mut Battle,
        request: SwitchRequest,
    ) -> Result<Transition<()>, Interrupt> {
        run::<SwitchOut>(battle, &request)
    }

    /// Replace `outgoing` with `incoming`. Nothing enters when the outgoing
    /// combatant is trapped.
    pub fn switch(
        battle: &mut Battle,
        outgoing: CombatantId,
        incoming: CombatantId,
    ) -> Result<Transition<()>, Interrupt> {
        let out = Self::switch_out(battle, SwitchRequest::new(outgoing))?;
        if !out.occurred {
            return Ok(out);
        }
        Self::switch_in(battle, incoming)
    }
}

struct SwitchOut;

impl Mediator for SwitchOut {
    type Request = SwitchRequest;
    type Value = ();

    const KIND: TransitionKind = TransitionKind::SwitchOut;

    fn target(request: &SwitchRequest) -> Owner {
        Owner::Combatant(request.combatant)
    }

    fn origin(request: &SwitchRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &SwitchRequest) -> Result<(), Interrupt> {
        battle.state().require(request.combatant)?;
        if !battle.state().is_active(request.combatant) {
            return Err(BattleError::NotActive(request.combatant).into());
        }
        Ok(())
    }

    fn current(_battle: &Battle, _request: &SwitchRequest) {}

    /// Trapping effects usually sit on an opponent, so every live effect is
    /// asked.
    fn pre(
        battle: &mut Battle,
        request: &SwitchRequest,
        initial: (),
    ) -> Result<Dispatch<()>, Interrupt> {
        if request.forced {
            return Ok(Dispatch::Proceed(initial));
        }
        let effects = battle.effects().gather_wide(battle.state(), Some(Self::target(request)));
        dispatch(battle, &effects, initial, |effect, this, battle, _| {
            effect.on_before_switch_out(this, battle, request)
        })
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        _value: &(),
    ) -> Hook<()> {
        effect.on_before_switch_out(this, battle, request)
    }

    fn apply(
        _battle: &mut Battle,
        _request: &SwitchRequest,
        _value: (),
    ) -> Result<Transition<()>, Interrupt> {
        Ok(Transition::applied(()))
    }

    fn announce(battle: &mut Battle, request: &SwitchRequest, _outcome: &Transition<()>) {
        battle.display_message(&Message::new("switched_out").subject(request.combatant));
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        effect.on_switch_out(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<()>) -> i64 {
        i64::from(outcome.occurred)
    }

    fn settle(
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Result<(), Interrupt> {
        if !outcome.occurred {
            return Ok(());
        }
        battle.state_mut().require_mut(request.combatant)?.stages.clear();
        battle.effects_mut().clear(Owner::Combatant(request.combatant));
        battle.state_mut().leave_field(request.combatant);
        Ok(())
    }
}

struct SwitchIn;

impl Mediator for SwitchIn {
    type Request = SwitchRequest;
    type Value = ();

    const KIND: TransitionKind = TransitionKind::SwitchIn;
    const ANIMATED: bool = true;

    fn target(request: &SwitchRequest) -> Owner {
        Owner::Combatant(request.combatant)
    }

    fn origin(request: &SwitchRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &SwitchRequest) -> Result<(), Interrupt> {
        battle.state().require(request.combatant)?;
        Ok(())
    }

    fn current(_battle: &Battle, _request: &SwitchRequest) {}

    /// Entering the field cannot be refused.
    fn pre(
        _battle: &mut Battle,
        _request: &SwitchRequest,
        initial: (),
    ) -> Result<Dispatch<()>, Interrupt> {
        Ok(Dispatch::Proceed(initial))
    }

    fn pre_hook(
        _effect: &mut dyn Effect,
        _this: &EffectInstance,
        _battle: &mut Battle,
        _request: &SwitchRequest,
        _value: &(),
    ) -> Hook<()> {
        abstain()
    }

    fn apply(
        battle: &mut Battle,
        request: &SwitchRequest,
        _value: (),
    ) -> Result<Transition<()>, Interrupt> {
        let id = request.combatant;
        if battle.state().is_active(id) {
            return Ok(Transition::unchanged(()));
        }
        let combatant = battle.state().require(id)?;
        if combatant.is_down() {
            return Ok(Transition::unchanged(()));
        }
        let ability = combatant.ability.clone();
        let item = combatant.item.clone();
        let status = combatant.status;

        battle.state_mut().enter_field(id);
        let owner = Owner::Combatant(id);
        battle.attach_effect(owner, &ability, None);
        if let Some(item) = item {
            battle.attach_effect(owner, &item, None);
        }
        if let Some(status) = status {
            battle.attach_effect(owner, &EffectId::new(status.effect_key()), None);
        }
        Ok(Transition::applied(()))
    }

    fn announce(battle: &mut Battle, request: &SwitchRequest, outcome: &Transition<()>) {
        if outcome.occurred {
            battle.display_message(&Message::new("switched_in").subject(request.combatant));
        }
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        effect.on_switch_in(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<()>) -> i64 {
        i64::from(outcome.occurred)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::{PresentationCall, RecordingPresenter};
    use crate::core::{BattleConfig, Combatant, SideId, Stat, StatusCondition};
    use crate::effects::{veto, EffectRegistry, NoOpEffect};

    /// Traps every opponent of its holder.
    #[derive(Debug)]
    struct Trap;

    impl Effect for Trap {
        fn on_before_switch_out(
            &mut self,
            this: &EffectInstance,
            battle: &mut Battle,
            request: &SwitchRequest,
        ) -> Hook<()> {
            match this.holder() {
                Some(holder) if battle.state().are_opponents(holder, request.combatant) => veto(),
                _ => abstain(),
            }
        }
    }

    fn setup() -> (Battle, RecordingPresenter) {
        let recorder = RecordingPresenter::new();
        let mut registry = EffectRegistry::new();
        registry.register("none", |_| Box::new(NoOpEffect));
        registry.register("trap", |_| Box::new(Trap));
        registry.register("leftovers", |_| Box::new(NoOpEffect));
        registry.register("burn", |_| Box::new(NoOpEffect));
        let battle =
            Battle::new(BattleConfig::new(2), Arc::new(registry)).with_presenter(recorder.clone());
        (battle, recorder)
    }

    #[test]
    fn test_switch_in_attaches_in_order() {
        let (mut battle, recorder) = setup();
        let a = battle
            .add_combatant(
                Combatant::new("A", SideId::new(0), 40)
                    .with_ability("trap")
                    .with_item("leftovers")
                    .with_status(StatusCondition::Burn),
            )
            .unwrap();

        let outcome = SwitchHandler::switch_in(&mut battle, a).unwrap();
        assert!(outcome.occurred);
        assert!(battle.state().is_active(a));

        let ids: Vec<EffectId> = battle
            .effects()
            .snapshot(Owner::Combatant(a))
            .iter()
            .map(|e| e.id().clone())
            .collect();
        assert_eq!(
            ids,
            vec![EffectId::new("trap"), EffectId::new("leftovers"), EffectId::new("burn")]
        );
        assert_eq!(
            recorder.calls(),
            vec![
                PresentationCall::Message(Message::new("switched_in").subject(a)),
                PresentationCall::Wait,
            ]
        );
    }

    #[test]
    fn test_switch_in_twice_is_noop() {
        let (mut battle, _) = setup();
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        SwitchHandler::switch_in(&mut battle, a).unwrap();
        let again = SwitchHandler::switch_in(&mut battle, a).unwrap();
        assert!(!again.occurred);
        assert_eq!(battle.effects().snapshot(Owner::Combatant(a)).len(), 1);
    }

    #[test]
    fn test_switch_out_clears_volatile_state() {
        let (mut battle, _) = setup();
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        SwitchHandler::switch_in(&mut battle, a).unwrap();
        battle.state_mut().require_mut(a).unwrap().stages.apply(Stat::Attack, 2, 6);

        let outcome = SwitchHandler::switch_out(&mut battle, SwitchRequest::new(a)).unwrap();
        assert!(outcome.occurred);
        assert!(!battle.state().is_active(a));
        assert_eq!(battle.combatant(a).unwrap().stages.get(Stat::Attack), 0);
        assert!(battle.effects().snapshot(Owner::Combatant(a)).is_empty());
    }

    #[test]
    fn test_trapped_unless_forced() {
        let (mut battle, _) = setup();
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        let bench = battle.add_combatant(Combatant::new("Bench", SideId::new(0), 40)).unwrap();
        let b = battle
            .add_combatant(Combatant::new("B", SideId::new(1), 40).with_ability("trap"))
            .unwrap();
        SwitchHandler::switch_in(&mut battle, a).unwrap();
        SwitchHandler::switch_in(&mut battle, b).unwrap();

        let trapped = SwitchHandler::switch(&mut battle, a, bench).unwrap();
        assert!(!trapped.occurred);
        assert!(battle.state().is_active(a));
        assert!(!battle.state().is_active(bench));

        let forced = SwitchHandler::switch_out(&mut battle, SwitchRequest::forced(a)).unwrap();
        assert!(forced.occurred);
    }

    #[test]
    fn test_switch_out_requires_active() {
        let (mut battle, _) = setup();
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        let err = SwitchHandler::switch_out(&mut battle, SwitchRequest::new(a)).unwrap_err();
        assert_eq!(err, Interrupt::Fatal(BattleError::NotActive(a)));
    }
}
