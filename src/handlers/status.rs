//! Non-volatile status transitions.
//!
//! The condition is held twice, deliberately kept in step by this mediator
//! alone: as `Combatant::status` for other effects to read, and as the
//! effect implementing it (`:burn`, `:sleep`...) in the combatant's
//! container.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{CombatantId, Interrupt, Owner, StatusCondition, TransitionKind};
use crate::effects::{Effect, EffectId, EffectInstance, Hook, Message};

/// A request to set (`Some`) or cure (`None`) a combatant's status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRequest {
    pub target: CombatantId,
    pub status: Option<StatusCondition>,
    pub origin: Origin,
}

impl StatusRequest {
    /// Inflict a condition.
    #[must_use]
    pub fn inflict(target: CombatantId, status: StatusCondition) -> Self {
        Self {
            target,
            status: Some(status),
            origin: Origin::passive(),
        }
    }

    /// Cure whatever condition the target has.
    #[must_use]
    pub fn cure(target: CombatantId) -> Self {
        Self {
            target,
            status: None,
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

/// Mediator for status conditions.
///
/// A combatant holds at most one condition: inflicting a second one is a
/// no-op. The magnitude is the condition held afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusHandler;

impl StatusHandler {
    /// Inflict or cure.
    pub fn apply(
        battle: &mut Battle,
        request: StatusRequest,
    ) -> Result<Transition<Option<StatusCondition>>, Interrupt> {
        run::<StatusChange>(battle, &request)
    }
}

struct StatusChange;

impl Mediator for StatusChange {
    type Request = StatusRequest;
    type Value = Option<StatusCondition>;

    const KIND: TransitionKind = TransitionKind::Status;

    fn target(request: &StatusRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &StatusRequest) -> &Origin {
        &request.origin
    }

    fn initial(
        battle: &Battle,
        request: &StatusRequest,
    ) -> Result<Option<StatusCondition>, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.status)
    }

    fn current(battle: &Battle, request: &StatusRequest) -> Option<StatusCondition> {
        battle.combatant(request.target).and_then(|c| c.status)
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatusRequest,
        status: &Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        effect.modify_status(this, battle, request, *status)
    }

    fn apply(
        battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Result<Transition<Option<StatusCondition>>, Interrupt> {
        let target = battle.state_mut().require_mut(request.target)?;
        let previous = target.status;
        let blocked = match status {
            Some(_) => previous.is_some() || target.fainted,
            None => previous.is_none(),
        };
        if blocked {
            return Ok(Transition::unchanged(previous));
        }
        target.status = status;

        let owner = Owner::Combatant(request.target);
        if let Some(old) = previous {
            battle.detach_effect(owner, &EffectId::new(old.effect_key()));
        }
        if let Some(new) = status {
            battle.attach_effect(owner, &EffectId::new(new.effect_key()), None);
        }
        Ok(Transition::applied(status))
    }

    fn announce(
        battle: &mut Battle,
        request: &StatusRequest,
        outcome: &Transition<Option<StatusCondition>>,
    ) {
        let message = match (outcome.occurred, outcome.magnitude, request.status) {
            (true, Some(status), _) => Message::new("status_inflicted").arg(status.effect_key()),
            (true, None, _) => Message::new("status_cured"),
            (false, Some(_), Some(_)) => Message::new("already_has_status"),
            (false, _, _) => return,
        };
        battle.display_message(&message.subject(request.target));
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatusRequest,
        outcome: &Transition<Option<StatusCondition>>,
    ) -> Hook<()> {
        effect.on_after_status(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<Option<StatusCondition>>) -> i64 {
        i64::from(outcome.occurred)
    }
}
