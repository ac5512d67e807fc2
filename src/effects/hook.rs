//! The three-way hook contract.
//!
//! Every hook on [`Effect`](super::Effect) returns a [`Hook<T>`]:
//!
//! - `Abstain`: no opinion, dispatch moves on with the value unchanged.
//! - `Veto(cues)`: the transition must not happen. The mediator presents
//!   `cues` exactly once and stops evaluating the remaining effects.
//! - `Override(value)`: replace the value under consideration; the
//!   remaining effects see the replacement.
//!
//! The `Err` side carries an [`Interrupt`] so that a hook which itself
//! calls a mediator can propagate a battle end with `?`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

use super::id::EffectId;
use crate::core::{CombatantId, Interrupt};

/// Decision returned by one effect for one hook invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookResult<T> {
    /// No opinion.
    Abstain,
    /// Block the transition, presenting these cues.
    Veto(Cues),
    /// Replace the value for subsequent effects and for application.
    Override(T),
}

/// What every hook returns.
pub type Hook<T> = Result<HookResult<T>, Interrupt>;

/// Presentation requests attached to a veto.
pub type Cues = SmallVec<[Cue; 2]>;

/// Abstain from a hook.
pub fn abstain<T>() -> Hook<T> {
    Ok(HookResult::Abstain)
}

/// Replace the value under consideration.
pub fn override_with<T>(value: T) -> Hook<T> {
    Ok(HookResult::Override(value))
}

/// Veto silently.
pub fn veto<T>() -> Hook<T> {
    Ok(HookResult::Veto(Cues::new()))
}

/// Veto with explicit cues.
pub fn veto_with<T>(cues: impl IntoIterator<Item = Cue>) -> Hook<T> {
    Ok(HookResult::Veto(cues.into_iter().collect()))
}

/// Veto showing the holder's indicator followed by one message: the usual
/// shape of "X's Clear Body prevents stat loss!".
pub fn announced_veto<T>(holder: CombatantId, effect: &EffectId, message: Message) -> Hook<T> {
    veto_with([Cue::indicator(holder, effect.clone()), Cue::Message(message)])
}

/// One presentation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Flash the ability/item indicator of a combatant.
    Indicator {
        combatant: CombatantId,
        effect: EffectId,
    },
    /// Show a message.
    Message(Message),
}

impl Cue {
    /// Build an indicator cue.
    #[must_use]
    pub fn indicator(combatant: CombatantId, effect: EffectId) -> Self {
        Cue::Indicator { combatant, effect }
    }
}

/// A structured battle message. Text assembly belongs to the presentation
/// layer; the core only picks the key and its arguments.
///
/// ```
/// use battle_dispatch::core::CombatantId;
/// use battle_dispatch::effects::Message;
///
/// let msg = Message::new("stat_fell").subject(CombatantId(1)).arg("attack");
/// assert_eq!(msg.key, "stat_fell");
/// assert_eq!(msg.args.as_slice(), ["attack".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub key: Cow<'static, str>,
    pub subject: Option<CombatantId>,
    pub args: SmallVec<[String; 2]>,
}

impl Message {
    /// Create a message with no subject or arguments.
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
            subject: None,
            args: SmallVec::new(),
        }
    }

    /// Set the combatant the message is about (builder pattern).
    #[must_use]
    pub fn subject(mut self, combatant: CombatantId) -> Self {
        self.subject = Some(combatant);
        self
    }

    /// Append an argument (builder pattern).
    #[must_use]
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }
}
