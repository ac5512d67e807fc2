//! Attaching conditions that have no state of their own besides the
//! effect: volatiles on a combatant (`:flinch`), side conditions
//! (`:reflect`, `:stealth_rock`) and ad-hoc field effects.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{Interrupt, Owner, TransitionKind};
use crate::effects::{AddOutcome, Effect, EffectId, EffectInstance, Hook, Message};

/// A request to attach an effect to an owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachRequest {
    pub owner: Owner,
    pub effect: EffectId,
    /// Countdown; `None` uses the effect's own default.
    pub duration: Option<u32>,
    pub origin: Origin,
}

impl AttachRequest {
    #[must_use]
    pub fn new(owner: impl Into<Owner>, effect: impl Into<EffectId>) -> Self {
        Self {
            owner: owner.into(),
            effect: effect.into(),
            duration: None,
            origin: Origin::passive(),
        }
    }

    /// Set the countdown (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether the request comes from a combatant opposing the owner. For
    /// side owners, any combatant of another side is an opponent.
    #[must_use]
    pub fn is_from_opponent(&self, battle: &Battle) -> bool {
        let Some(source) = self.origin.combatant else {
            return false;
        };
        match self.owner {
            Owner::Combatant(target) => battle.state().are_opponents(source, target),
            Owner::Side(side) => battle.state().side_of(source).is_some_and(|s| s != side),
            Owner::Field => false,
        }
    }
}

/// Mediator for attaching conditions.
///
/// Attaching an identifier the owner already holds refreshes its countdown
/// when the new instance has one; otherwise it is a no-op ("already
/// present").
#[derive(Clone, Copy, Debug, Default)]
pub struct AttachHandler;

impl AttachHandler {
    /// Attach through the mediator.
    pub fn apply(battle: &mut Battle, request: AttachRequest) -> Result<Transition<()>, Interrupt> {
        run::<Attach>(battle, &request)
    }

    /// Remove a condition. Not interceptable.
    pub fn detach(battle: &mut Battle, owner: Owner, effect: &EffectId) -> bool {
        let removed = battle.detach_effect(owner, effect);
        if removed {
            let mut message = Message::new("condition_ended").arg(effect.as_str());
            if let Some(combatant) = owner.combatant() {
                message = message.subject(combatant);
            }
            battle.display_message(&message);
        }
        removed
    }
}

struct Attach;

impl Mediator for Attach {
    type Request = AttachRequest;
    type Value = ();

    const KIND: TransitionKind = TransitionKind::Attach;

    fn target(request: &AttachRequest) -> Owner {
        request.owner
    }

    fn origin(request: &AttachRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &AttachRequest) -> Result<(), Interrupt> {
        if let Owner::Combatant(id) = request.owner {
            battle.state().require(id)?;
        }
        Ok(())
    }

    fn current(_battle: &Battle, _request: &AttachRequest) {}

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AttachRequest,
        _value: &(),
    ) -> Hook<()> {
        effect.on_before_attach(this, battle, request)
    }

    fn apply(
        battle: &mut Battle,
        request: &AttachRequest,
        _value: (),
    ) -> Result<Transition<()>, Interrupt> {
        if let Some(id) = request.owner.combatant() {
            if battle.state().require(id)?.is_down() {
                return Ok(Transition::unchanged(()));
            }
        }
        match battle.attach_effect(request.owner, &request.effect, request.duration) {
            AddOutcome::AlreadyPresent => Ok(Transition::unchanged(())),
            AddOutcome::Added | AddOutcome::Refreshed => Ok(Transition::applied(())),
        }
    }

    fn announce(battle: &mut Battle, request: &AttachRequest, outcome: &Transition<()>) {
        let key = match outcome.occurred {
            true => "condition_started",
            false if battle.has_effect(request.owner, &request.effect) => "already_present",
            false => return,
        };
        let mut message = Message::new(key).arg(request.effect.as_str());
        if let Some(combatant) = request.owner.combatant() {
            message = message.subject(combatant);
        }
        battle.display_message(&message);
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AttachRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        effect.on_after_attach(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<()>) -> i64 {
        i64::from(outcome.occurred)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::RecordingPresenter;
    use crate::core::{BattleConfig, Combatant, CombatantId, SideId};
    use crate::effects::{abstain, veto, EffectRegistry, NoOpEffect};

    /// Blocks `:flinch` on its holder.
    #[derive(Debug)]
    struct Focus;

    impl Effect for Focus {
        fn on_before_attach(
            &mut self,
            this: &EffectInstance,
            _battle: &mut Battle,
            request: &AttachRequest,
        ) -> Hook<()> {
            if request.owner == this.owner() && request.effect == EffectId::new("flinch") {
                veto()
            } else {
                abstain()
            }
        }
    }

    fn setup() -> (Battle, RecordingPresenter, CombatantId, CombatantId) {
        let recorder = RecordingPresenter::new();
        let mut registry = EffectRegistry::new();
        registry.register("focus", |_| Box::new(Focus));
        registry.register("flinch", |_| Box::new(NoOpEffect));
        registry.register("reflect", |_| Box::new(NoOpEffect));
        let mut battle =
            Battle::new(BattleConfig::new(2), Arc::new(registry)).with_presenter(recorder.clone());
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        let b = battle.add_combatant(Combatant::new("B", SideId::new(1), 40)).unwrap();
        (battle, recorder, a, b)
    }

    #[test]
    fn test_attach_refresh_and_detach() {
        let (mut battle, recorder, _, _) = setup();
        let side = Owner::Side(SideId::new(0));
        let reflect = EffectId::new("reflect");

        let five_turns = AttachRequest::new(side, "reflect").with_duration(5);
        let first = AttachHandler::apply(&mut battle, five_turns.clone()).unwrap();
        assert!(first.occurred);
        battle.effect(side, &reflect).unwrap().set_remaining(Some(2));

        let refresh = AttachHandler::apply(&mut battle, five_turns).unwrap();
        assert!(refresh.occurred);
        assert_eq!(battle.effect(side, &reflect).unwrap().remaining(), Some(5));

        let permanent =
            AttachHandler::apply(&mut battle, AttachRequest::new(side, "reflect")).unwrap();
        assert!(!permanent.occurred);

        assert!(AttachHandler::detach(&mut battle, side, &reflect));
        assert!(!AttachHandler::detach(&mut battle, side, &reflect));
        assert_eq!(
            recorder.message_keys(),
            vec!["condition_started", "condition_started", "already_present", "condition_ended"]
        );
    }

    #[test]
    fn test_holder_can_veto() {
        let (mut battle, recorder, a, b) = setup();
        battle.attach_effect(Owner::Combatant(a), &EffectId::new("focus"), None);

        let flinch = AttachRequest::new(a, "flinch").with_origin(Origin::by(b));
        let outcome = AttachHandler::apply(&mut battle, flinch).unwrap();
        assert!(!outcome.occurred);
        assert!(!battle.has_effect(Owner::Combatant(a), &EffectId::new("flinch")));
        assert!(recorder.calls().is_empty());

        AttachHandler::apply(&mut battle, AttachRequest::new(b, "flinch")).unwrap();
        assert!(battle.has_effect(Owner::Combatant(b), &EffectId::new("flinch")));
    }

    #[test]
    fn test_is_from_opponent_for_sides() {
        let (battle, _, a, b) = setup();
        let on_own_side = AttachRequest::new(SideId::new(0), "reflect").with_origin(Origin::by(a));
        let on_their_side =
            AttachRequest::new(SideId::new(0), "reflect").with_origin(Origin::by(b));
        assert!(!on_own_side.is_from_opponent(&battle));
        assert!(on_their_side.is_from_opponent(&battle));
    }
}
