//! The single fold every mediator uses.
//!
//! [`dispatch`] walks a snapshot of effect handles and folds their
//! [`HookResult`]s into one [`Dispatch`]:
//!
//! 1. Dead instances are skipped. An instance killed by an earlier hook in
//!    the same pass is never invoked.
//! 2. An instance whose behavior is already running a hook further up the
//!    stack is skipped.
//! 3. `Abstain` keeps the running value, `Override(v)` replaces it, and the
//!    first `Veto` stops the pass. Later effects are not invoked.
//! 4. Dead instances are purged from their containers once the pass ends,
//!    whether it completed, was vetoed, or was interrupted.
//!
//! Effects added during a pass are not in its snapshot and therefore not
//! invoked by it.

use super::effect::{Effect, EffectHandle, EffectInstance};
use super::hook::{Cues, Hook, HookResult};
use super::id::EffectId;
use crate::battle::Battle;
use crate::core::{Interrupt, Owner};

/// Folded outcome of one dispatch pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<T> {
    /// No veto; the value after every override.
    Proceed(T),
    /// The first veto in dispatch order.
    Vetoed {
        /// Identifier of the vetoing effect.
        by: EffectId,
        /// Owner of the vetoing effect.
        holder: Owner,
        /// Presentation the veto asked for.
        cues: Cues,
    },
}

impl<T> Dispatch<T> {
    /// Whether the pass ended in a veto.
    #[must_use]
    pub fn is_vetoed(&self) -> bool {
        matches!(self, Dispatch::Vetoed { .. })
    }

    /// The final value, if not vetoed.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Dispatch::Proceed(value) => Some(value),
            Dispatch::Vetoed { .. } => None,
        }
    }
}

/// Invoke `hook` on every live, idle effect in `effects`, in order.
///
/// `hook` receives the behavior, its instance, the battle and the value as
/// it stands after every earlier effect.
pub fn dispatch<T, F>(
    battle: &mut Battle,
    effects: &[EffectHandle],
    initial: T,
    hook: F,
) -> Result<Dispatch<T>, Interrupt>
where
    F: FnMut(&mut dyn Effect, &EffectInstance, &mut Battle, &T) -> Hook<T>,
{
    let folded = fold(battle, effects, initial, hook);
    battle.effects_mut().purge_dead();
    folded
}

fn fold<T, F>(
    battle: &mut Battle,
    effects: &[EffectHandle],
    initial: T,
    mut hook: F,
) -> Result<Dispatch<T>, Interrupt>
where
    F: FnMut(&mut dyn Effect, &EffectInstance, &mut Battle, &T) -> Hook<T>,
{
    let mut value = initial;
    for handle in effects {
        if !handle.is_alive() {
            continue;
        }
        let Some(mut behavior) = handle.try_behavior() else {
            tracing::trace!(effect = %handle.id(), owner = %handle.owner(), "effect busy, skipped");
            continue;
        };
        let result = hook(&mut **behavior, &**handle, battle, &value);
        drop(behavior);

        match result? {
            HookResult::Abstain => {}
            HookResult::Override(next) => {
                tracing::trace!(effect = %handle.id(), owner = %handle.owner(), "override");
                value = next;
            }
            HookResult::Veto(cues) => {
                tracing::trace!(effect = %handle.id(), owner = %handle.owner(), "veto");
                return Ok(Dispatch::Vetoed {
                    by: handle.id().clone(),
                    holder: handle.owner(),
                    cues,
                });
            }
        }
    }
    Ok(Dispatch::Proceed(value))
}
