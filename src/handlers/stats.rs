//! Stat-stage transitions.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{CombatantId, Interrupt, Owner, Stat, TransitionKind};
use crate::effects::{Effect, EffectInstance, Hook, Message};

/// A request to move one stat stage of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatChangeRequest {
    pub target: CombatantId,
    pub stat: Stat,
    /// Requested change; negative lowers.
    pub delta: i8,
    pub origin: Origin,
}

impl StatChangeRequest {
    /// Passive stage change.
    #[must_use]
    pub fn new(target: CombatantId, stat: Stat, delta: i8) -> Self {
        Self {
            target,
            stat,
            delta,
            origin: Origin::passive(),
        }
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether an opposing combatant asked for the change.
    #[must_use]
    pub fn is_from_opponent(&self, battle: &Battle) -> bool {
        self.origin
            .combatant
            .is_some_and(|source| battle.state().are_opponents(source, self.target))
    }
}

/// Mediator for stat-stage changes.
///
/// The magnitude is the number of stages actually moved after clamping to
/// the configured stage limit. A change blocked by the limit is a no-op
/// with a "won't go higher/lower" message; a vetoed change shows only the
/// veto's cues.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatHandler;

impl StatHandler {
    /// Apply a stage change.
    pub fn apply(
        battle: &mut Battle,
        request: StatChangeRequest,
    ) -> Result<Transition<i8>, Interrupt> {
        run::<StatChange>(battle, &request)
    }
}

struct StatChange;

impl Mediator for StatChange {
    type Request = StatChangeRequest;
    type Value = i8;

    const KIND: TransitionKind = TransitionKind::StatChange;
    const ANIMATED: bool = true;

    fn target(request: &StatChangeRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &StatChangeRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &StatChangeRequest) -> Result<i8, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.delta)
    }

    fn current(_battle: &Battle, _request: &StatChangeRequest) -> i8 {
        0
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        delta: &i8,
    ) -> Hook<i8> {
        effect.modify_stat_change(this, battle, request, *delta)
    }

    fn apply(
        battle: &mut Battle,
        request: &StatChangeRequest,
        delta: i8,
    ) -> Result<Transition<i8>, Interrupt> {
        let limit = battle.config().stage_limit;
        let target = battle.state_mut().require_mut(request.target)?;
        let moved = target.stages.apply(request.stat, delta, limit);
        if moved == 0 {
            return Ok(Transition::unchanged(0));
        }
        Ok(Transition::applied(moved))
    }

    fn announce(battle: &mut Battle, request: &StatChangeRequest, outcome: &Transition<i8>) {
        let key = if outcome.occurred {
            match outcome.magnitude {
                moved if moved >= 2 => "stat_rose_sharply",
                moved if moved > 0 => "stat_rose",
                moved if moved <= -2 => "stat_fell_harshly",
                _ => "stat_fell",
            }
        } else {
            let limit = battle.config().stage_limit;
            let stage = battle
                .combatant(request.target)
                .map_or(0, |c| c.stages.get(request.stat));
            match request.delta {
                requested if requested > 0 && stage >= limit => "stat_wont_go_higher",
                requested if requested < 0 && stage <= -limit => "stat_wont_go_lower",
                _ => return,
            }
        };
        let message = Message::new(key).subject(request.target).arg(request.stat.key());
        battle.display_message(&message);
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        outcome: &Transition<i8>,
    ) -> Hook<()> {
        effect.on_after_stat_change(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<i8>) -> i64 {
        i64::from(outcome.magnitude)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::RecordingPresenter;
    use crate::core::{BattleConfig, Combatant, SideId};
    use crate::effects::{abstain, override_with, EffectId, EffectRegistry};

    /// Doubles any increase.
    #[derive(Debug)]
    struct Simple;

    impl Effect for Simple {
        fn modify_stat_change(
            &mut self,
            _this: &EffectInstance,
            _battle: &mut Battle,
            _request: &StatChangeRequest,
            delta: i8,
        ) -> Hook<i8> {
            if delta > 0 {
                override_with(delta * 2)
            } else {
                abstain()
            }
        }
    }

    fn setup() -> (Battle, RecordingPresenter, CombatantId, CombatantId) {
        let recorder = RecordingPresenter::new();
        let mut registry = EffectRegistry::new();
        registry.register("simple", |_| Box::new(Simple));
        let mut battle = Battle::new(BattleConfig::new(2).with_stage_limit(6), Arc::new(registry))
            .with_presenter(recorder.clone());
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 40)).unwrap();
        let b = battle.add_combatant(Combatant::new("B", SideId::new(1), 40)).unwrap();
        (battle, recorder, a, b)
    }

    #[test]
    fn test_stage_moves_and_messages() {
        let (mut battle, recorder, a, _) = setup();
        let outcome =
            StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Attack, -1)).unwrap();

        assert_eq!(outcome, Transition::applied(-1));
        assert_eq!(battle.combatant(a).unwrap().stages.get(Stat::Attack), -1);
        assert_eq!(recorder.message_keys(), vec!["stat_fell"]);
        assert_eq!(recorder.messages()[0].args.as_slice(), ["attack".to_string()]);
    }

    #[test]
    fn test_override_applies() {
        let (mut battle, recorder, a, _) = setup();
        battle.attach_effect(Owner::Combatant(a), &EffectId::new("simple"), None);

        let outcome =
            StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Speed, 1)).unwrap();
        assert_eq!(outcome.magnitude, 2);
        assert_eq!(recorder.message_keys(), vec!["stat_rose_sharply"]);
    }

    #[test]
    fn test_limit_is_noop_with_message() {
        let (mut battle, recorder, a, _) = setup();
        StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Defense, 6)).unwrap();
        recorder.clear();

        let request = StatChangeRequest::new(a, Stat::Defense, 2);
        let outcome = StatHandler::apply(&mut battle, request).unwrap();
        assert_eq!(outcome, Transition::unchanged(0));
        assert_eq!(battle.combatant(a).unwrap().stages.get(Stat::Defense), 6);
        assert_eq!(recorder.message_keys(), vec!["stat_wont_go_higher"]);
        let last = battle.state().history().last().unwrap().clone();
        assert_eq!(last.magnitude, 0);
        assert!(!last.occurred);
    }

    #[test]
    fn test_lower_limit_and_zero_delta() {
        let (mut battle, recorder, a, _) = setup();
        StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Speed, -6)).unwrap();
        recorder.clear();

        let outcome =
            StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Speed, -3)).unwrap();
        assert_eq!(outcome, Transition::unchanged(0));
        assert_eq!(recorder.message_keys(), vec!["stat_wont_go_lower"]);
        recorder.clear();

        // Nothing asked for, nothing to explain.
        let outcome =
            StatHandler::apply(&mut battle, StatChangeRequest::new(a, Stat::Attack, 0)).unwrap();
        assert_eq!(outcome, Transition::unchanged(0));
        assert!(recorder.message_keys().is_empty());
    }

    #[test]
    fn test_is_from_opponent() {
        let (battle, _, a, b) = setup();
        let request = StatChangeRequest::new(a, Stat::Attack, -1).with_origin(Origin::by(b));
        assert!(request.is_from_opponent(&battle));
        let own = StatChangeRequest::new(a, Stat::Attack, -1).with_origin(Origin::by(a));
        assert!(!own.is_from_opponent(&battle));
        assert!(!StatChangeRequest::new(a, Stat::Attack, -1).is_from_opponent(&battle));
    }
}
