//! Ability replacement.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{CombatantId, Interrupt, Owner, TransitionKind};
use crate::data::RecordKind;
use crate::effects::{Effect, EffectId, EffectInstance, Hook, Message};

/// A request to replace a combatant's ability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityRequest {
    pub target: CombatantId,
    pub ability: EffectId,
    pub origin: Origin,
}

impl AbilityRequest {
    #[must_use]
    pub fn new(target: CombatantId, ability: impl Into<EffectId>) -> Self {
        Self {
            target,
            ability: ability.into(),
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

/// Mediator for ability changes. The magnitude is the ability held
/// afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbilityHandler;

impl AbilityHandler {
    /// Replace the ability.
    pub fn apply(
        battle: &mut Battle,
        request: AbilityRequest,
    ) -> Result<Transition<EffectId>, Interrupt> {
        run::<AbilityChange>(battle, &request)
    }
}

struct AbilityChange;

impl Mediator for AbilityChange {
    type Request = AbilityRequest;
    type Value = EffectId;

    const KIND: TransitionKind = TransitionKind::Ability;

    fn target(request: &AbilityRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &AbilityRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &AbilityRequest) -> Result<EffectId, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.ability.clone())
    }

    fn current(battle: &Battle, request: &AbilityRequest) -> EffectId {
        battle
            .combatant(request.target)
            .map_or_else(EffectId::none, |c| c.ability.clone())
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AbilityRequest,
        ability: &EffectId,
    ) -> Hook<EffectId> {
        effect.modify_ability_change(this, battle, request, ability)
    }

    fn apply(
        battle: &mut Battle,
        request: &AbilityRequest,
        ability: EffectId,
    ) -> Result<Transition<EffectId>, Interrupt> {
        let target = battle.state_mut().require_mut(request.target)?;
        if target.ability == ability {
            return Ok(Transition::unchanged(ability));
        }
        let previous = std::mem::replace(&mut target.ability, ability.clone());

        if battle.state().is_active(request.target) {
            let owner = Owner::Combatant(request.target);
            battle.detach_effect(owner, &previous);
            battle.attach_effect(owner, &ability, None);
        }
        Ok(Transition::applied(ability))
    }

    fn announce(battle: &mut Battle, request: &AbilityRequest, outcome: &Transition<EffectId>) {
        if !outcome.occurred {
            return;
        }
        let name = battle
            .data()
            .display_name(RecordKind::Ability, outcome.magnitude.as_str())
            .to_string();
        battle.display_message(&Message::new("ability_changed").subject(request.target).arg(name));
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AbilityRequest,
        outcome: &Transition<EffectId>,
    ) -> Hook<()> {
        effect.on_after_ability_change(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<EffectId>) -> i64 {
        i64::from(outcome.occurred)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::RecordingPresenter;
    use crate::core::{BattleConfig, Combatant, SideId};
    use crate::effects::{EffectRegistry, NoOpEffect};
    use crate::handlers::SwitchHandler;

    #[test]
    fn test_replaces_active_effect() {
        let recorder = RecordingPresenter::new();
        let mut registry = EffectRegistry::new();
        registry.register("levitate", |_| Box::new(NoOpEffect));
        registry.register("insomnia", |_| Box::new(NoOpEffect));
        let mut battle =
            Battle::new(BattleConfig::new(2), Arc::new(registry)).with_presenter(recorder.clone());
        let a = battle
            .add_combatant(Combatant::new("A", SideId::new(0), 40).with_ability("levitate"))
            .unwrap();
        SwitchHandler::switch_in(&mut battle, a).unwrap();
        recorder.clear();

        let outcome =
            AbilityHandler::apply(&mut battle, AbilityRequest::new(a, "insomnia")).unwrap();
        assert_eq!(outcome, Transition::applied(EffectId::new("insomnia")));

        let owner = Owner::Combatant(a);
        assert!(battle.has_effect(owner, &EffectId::new("insomnia")));
        assert!(!battle.has_effect(owner, &EffectId::new("levitate")));
        assert_eq!(recorder.message_keys(), vec!["ability_changed"]);

        let same = AbilityHandler::apply(&mut battle, AbilityRequest::new(a, "insomnia")).unwrap();
        assert!(!same.occurred);
    }
}
