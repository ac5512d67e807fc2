//! The presentation collaborator.
//!
//! Mediators are the only callers. They issue indicator, message and
//! animation requests synchronously, in transition order, so the recorded
//! call sequence of a [`RecordingPresenter`] is the exact order a player
//! would see.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::CombatantId;
use crate::effects::{EffectId, Message};

/// Scene/visual layer as seen from the dispatch core.
///
/// `wait_for_animation` blocks until the current animation has finished;
/// cancelling it does not undo the transition it belongs to.
pub trait Presenter {
    /// Flash the ability or item indicator of a combatant.
    fn show_indicator(&mut self, combatant: CombatantId, effect: &EffectId);

    /// Show a battle message.
    fn display_message(&mut self, message: &Message);

    /// Play the pending animation and wait for it.
    fn wait_for_animation(&mut self);
}

/// Presenter that ignores everything. The default for new battles.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show_indicator(&mut self, _combatant: CombatantId, _effect: &EffectId) {}

    fn display_message(&mut self, _message: &Message) {}

    fn wait_for_animation(&mut self) {}
}

/// One recorded presenter call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationCall {
    Indicator { combatant: CombatantId, effect: EffectId },
    Message(Message),
    Wait,
}

/// Presenter that records every call.
///
/// Clones share one log, so a test keeps a clone and hands the other to the
/// battle.
///
/// ## Example
///
/// ```
/// use battle_dispatch::battle::{PresentationCall, Presenter, RecordingPresenter};
/// use battle_dispatch::effects::Message;
///
/// let recorder = RecordingPresenter::new();
/// let mut handed_out = recorder.clone();
/// handed_out.display_message(&Message::new("but_it_failed"));
/// handed_out.wait_for_animation();
///
/// assert_eq!(recorder.message_keys(), vec!["but_it_failed"]);
/// assert_eq!(recorder.calls().last(), Some(&PresentationCall::Wait));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    calls: Rc<RefCell<Vec<PresentationCall>>>,
}

impl RecordingPresenter {
    /// Create a recorder with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.borrow().clone()
    }

    /// Indicator calls only.
    #[must_use]
    pub fn indicators(&self) -> Vec<(CombatantId, EffectId)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Indicator { combatant, effect } => {
                    Some((*combatant, effect.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Messages only.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Message(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Keys of the recorded messages.
    #[must_use]
    pub fn message_keys(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.key.into_owned()).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Presenter for RecordingPresenter {
    fn show_indicator(&mut self, combatant: CombatantId, effect: &EffectId) {
        self.calls.borrow_mut().push(PresentationCall::Indicator {
            combatant,
            effect: effect.clone(),
        });
    }

    fn display_message(&mut self, message: &Message) {
        self.calls
            .borrow_mut()
            .push(PresentationCall::Message(message.clone()));
    }

    fn wait_for_animation(&mut self) {
        self.calls.borrow_mut().push(PresentationCall::Wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_order() {
        let recorder = RecordingPresenter::new();
        let mut presenter = recorder.clone();

        presenter.show_indicator(CombatantId(1), &EffectId::new("clear_body"));
        presenter.display_message(&Message::new("stat_loss_prevented").subject(CombatantId(1)));

        assert_eq!(
            recorder.calls(),
            vec![
                PresentationCall::Indicator {
                    combatant: CombatantId(1),
                    effect: EffectId::new("clear_body"),
                },
                PresentationCall::Message(
                    Message::new("stat_loss_prevented").subject(CombatantId(1)),
                ),
            ]
        );
        assert_eq!(recorder.indicators().len(), 1);

        recorder.clear();
        assert!(recorder.calls().is_empty());
    }
}
