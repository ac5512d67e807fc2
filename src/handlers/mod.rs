//! The mediator family.
//!
//! One mediator per kind of state transition. Every mediator runs the same
//! sequence:
//!
//! 1. **Gather** the effects that may intercept the transition.
//! 2. **Pre**: broadcast the pre hook and fold the answers. The first veto
//!    wins; overrides chain.
//! 3. **Apply** the folded value to battle state (skipped on veto).
//! 4. **Present**: veto cues on veto; otherwise the transition's own
//!    messages and animation.
//! 5. **Post**: broadcast the post hook to every live effect, always, even
//!    after a veto or a zero-magnitude change.
//! 6. **Settle**: follow-up required by the transition itself (fainting,
//!    leaving the field, ending the battle).
//!
//! Mediators are the only code that talks to the presenter, so the order
//! of messages always matches the order of transitions.
//!
//! ## Interrupts
//!
//! Every mediator returns `Result<Transition<_>, Interrupt>`. A battle end
//! raised anywhere in a chain of nested mediator calls propagates through
//! `?` and no further dispatch runs for the current action. Nesting deeper
//! than [`BattleConfig::max_dispatch_depth`](crate::core::BattleConfig)
//! is a fatal error.

mod ability;
mod attach;
mod damage;
mod field;
mod item;
mod stats;
mod status;
mod switch;

pub use ability::{AbilityHandler, AbilityRequest};
pub use attach::{AttachHandler, AttachRequest};
pub use damage::{DamageHandler, DamageRequest, HealRequest};
pub use field::{
    FieldRequest, TerrainHandler, TerrainRequest, WeatherHandler, WeatherRequest,
    DEFAULT_FIELD_DURATION,
};
pub use item::{ItemHandler, ItemRequest};
pub use stats::{StatChangeRequest, StatHandler};
pub use status::{StatusHandler, StatusRequest};
pub use switch::{SwitchHandler, SwitchRequest};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::Battle;
use crate::core::{CombatantId, Interrupt, Owner, TransitionKind, TransitionRecord};
use crate::effects::{dispatch, Dispatch, Effect, EffectId, EffectInstance, Hook};

/// Result of one mediator call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<T> {
    /// Whether state changed. `false` after a veto or a no-op.
    pub occurred: bool,
    /// The effective magnitude: damage dealt, stages moved, the status now
    /// held, and so on.
    pub magnitude: T,
}

impl<T> Transition<T> {
    /// A transition that changed state.
    #[must_use]
    pub fn applied(magnitude: T) -> Self {
        Self {
            occurred: true,
            magnitude,
        }
    }

    /// A transition that left state unchanged.
    #[must_use]
    pub fn unchanged(magnitude: T) -> Self {
        Self {
            occurred: false,
            magnitude,
        }
    }
}

/// Who or what asked for a transition.
///
/// Passive transitions (weather damage, residual healing) have no
/// combatant. Transitions requested by an effect name it, and may ask the
/// mediator to flash its indicator when the transition goes through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub combatant: Option<CombatantId>,
    pub effect: Option<EffectId>,
    /// Show the effect's indicator on the combatant before the transition's
    /// own messages.
    pub announce: bool,
}

impl Origin {
    /// No originator.
    #[must_use]
    pub fn passive() -> Self {
        Self::default()
    }

    /// A combatant acting directly (a move).
    #[must_use]
    pub fn by(combatant: CombatantId) -> Self {
        Self {
            combatant: Some(combatant),
            ..Self::default()
        }
    }

    /// An effect acting on behalf of its holder.
    #[must_use]
    pub fn from_effect(effect: &EffectInstance) -> Self {
        Self {
            combatant: effect.holder(),
            effect: Some(effect.id().clone()),
            announce: false,
        }
    }

    /// Flash the effect indicator when the transition happens (builder
    /// pattern).
    #[must_use]
    pub fn announced(mut self) -> Self {
        self.announce = true;
        self
    }
}

/// The per-transition parts of the shared sequence.
pub(crate) trait Mediator {
    type Request;
    type Value: Clone;

    const KIND: TransitionKind;

    /// Whether applying the transition plays an animation.
    const ANIMATED: bool = false;

    fn target(request: &Self::Request) -> Owner;

    fn origin(request: &Self::Request) -> &Origin;

    /// Validate the request and produce the value the pre hooks start from.
    fn initial(battle: &Battle, request: &Self::Request) -> Result<Self::Value, Interrupt>;

    /// The magnitude reported when the transition is vetoed.
    fn current(battle: &Battle, request: &Self::Request) -> Self::Value;

    /// Gather and fold the pre hooks. Targeted transitions consult the
    /// target's gather.
    fn pre(
        battle: &mut Battle,
        request: &Self::Request,
        initial: Self::Value,
    ) -> Result<Dispatch<Self::Value>, Interrupt> {
        let effects = battle.effects().gather_owner(battle.state(), Self::target(request));
        dispatch(battle, &effects, initial, |effect, this, battle, value| {
            Self::pre_hook(effect, this, battle, request, value)
        })
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &Self::Request,
        value: &Self::Value,
    ) -> Hook<Self::Value>;

    /// Write the folded value to state.
    fn apply(
        battle: &mut Battle,
        request: &Self::Request,
        value: Self::Value,
    ) -> Result<Transition<Self::Value>, Interrupt>;

    /// Messages for a transition that was not vetoed.
    fn announce(
        _battle: &mut Battle,
        _request: &Self::Request,
        _outcome: &Transition<Self::Value>,
    ) {
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &Self::Request,
        outcome: &Transition<Self::Value>,
    ) -> Hook<()>;

    /// Signed magnitude for the transition history.
    fn record_magnitude(_outcome: &Transition<Self::Value>) -> i64 {
        0
    }

    /// Follow-up after the post hooks.
    fn settle(
        _battle: &mut Battle,
        _request: &Self::Request,
        _outcome: &Transition<Self::Value>,
    ) -> Result<(), Interrupt> {
        Ok(())
    }
}

/// Run one transition through the shared sequence.
pub(crate) fn run<M: Mediator>(
    battle: &mut Battle,
    request: &M::Request,
) -> Result<Transition<M::Value>, Interrupt> {
    battle.ensure_running()?;
    battle.enter_dispatch()?;
    let outcome = resolve::<M>(battle, request);
    battle.exit_dispatch();
    outcome
}

fn resolve<M: Mediator>(
    battle: &mut Battle,
    request: &M::Request,
) -> Result<Transition<M::Value>, Interrupt> {
    let target = M::target(request);
    let initial = M::initial(battle, request)?;

    let outcome = match M::pre(battle, request, initial)? {
        Dispatch::Proceed(value) => {
            let outcome = M::apply(battle, request, value)?;
            if outcome.occurred {
                debug!(kind = ?M::KIND, %target, "transition applied");
                announce_origin(battle, M::origin(request));
            }
            M::announce(battle, request, &outcome);
            if outcome.occurred && M::ANIMATED {
                battle.wait_for_animation();
            }
            outcome
        }
        Dispatch::Vetoed { by, holder, cues } => {
            debug!(kind = ?M::KIND, %target, effect = %by, %holder, "transition vetoed");
            battle.present(&cues);
            Transition::unchanged(M::current(battle, request))
        }
    };

    let action = battle.state().action;
    battle.state_mut().record(TransitionRecord {
        action,
        kind: M::KIND,
        target,
        occurred: outcome.occurred,
        magnitude: M::record_magnitude(&outcome),
    });

    let effects = battle.effects().gather_wide(battle.state(), Some(target));
    dispatch(battle, &effects, (), |effect, this, battle, _| {
        M::post_hook(effect, this, battle, request, &outcome)
    })?;

    M::settle(battle, request, &outcome)?;
    Ok(outcome)
}

fn announce_origin(battle: &mut Battle, origin: &Origin) {
    if !origin.announce {
        return;
    }
    if let (Some(combatant), Some(effect)) = (origin.combatant, &origin.effect) {
        battle.show_indicator(combatant, effect);
    }
}
