//! Held-item transitions.

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{CombatantId, Interrupt, Owner, TransitionKind};
use crate::data::RecordKind;
use crate::effects::{Effect, EffectId, EffectInstance, Hook, Message};

/// A request to replace a combatant's held item. `None` removes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRequest {
    pub target: CombatantId,
    pub item: Option<EffectId>,
    /// The holder used the item up (a berry eaten, a sash spent) rather
    /// than losing it.
    pub consumed: bool,
    pub origin: Origin,
}

impl ItemRequest {
    /// Give the target an item.
    #[must_use]
    pub fn give(target: CombatantId, item: impl Into<EffectId>) -> Self {
        Self {
            target,
            item: Some(item.into()),
            consumed: false,
            origin: Origin::passive(),
        }
    }

    /// Take the target's item away.
    #[must_use]
    pub fn take(target: CombatantId) -> Self {
        Self {
            target,
            item: None,
            consumed: false,
            origin: Origin::passive(),
        }
    }

    /// The target uses its item up.
    #[must_use]
    pub fn consume(target: CombatantId) -> Self {
        Self {
            consumed: true,
            ..Self::take(target)
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

/// Mediator for held items.
///
/// The item's effect lives in the holder's container only while the holder
/// is on the field; a benched combatant's item is attached at switch-in.
/// The magnitude is the item held afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemHandler;

impl ItemHandler {
    /// Change the held item.
    pub fn apply(
        battle: &mut Battle,
        request: ItemRequest,
    ) -> Result<Transition<Option<EffectId>>, Interrupt> {
        run::<ItemChange>(battle, &request)
    }
}

struct ItemChange;

impl Mediator for ItemChange {
    type Request = ItemRequest;
    type Value = Option<EffectId>;

    const KIND: TransitionKind = TransitionKind::Item;

    fn target(request: &ItemRequest) -> Owner {
        Owner::Combatant(request.target)
    }

    fn origin(request: &ItemRequest) -> &Origin {
        &request.origin
    }

    fn initial(battle: &Battle, request: &ItemRequest) -> Result<Option<EffectId>, Interrupt> {
        battle.state().require(request.target)?;
        Ok(request.item.clone())
    }

    fn current(battle: &Battle, request: &ItemRequest) -> Option<EffectId> {
        battle.combatant(request.target).and_then(|c| c.item.clone())
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &ItemRequest,
        item: &Option<EffectId>,
    ) -> Hook<Option<EffectId>> {
        effect.modify_item_change(this, battle, request, item.as_ref())
    }

    fn apply(
        battle: &mut Battle,
        request: &ItemRequest,
        item: Option<EffectId>,
    ) -> Result<Transition<Option<EffectId>>, Interrupt> {
        let target = battle.state_mut().require_mut(request.target)?;
        if target.item == item {
            return Ok(Transition::unchanged(item));
        }
        let previous = std::mem::replace(&mut target.item, item.clone());

        if battle.state().is_active(request.target) {
            let owner = Owner::Combatant(request.target);
            if let Some(old) = &previous {
                battle.detach_effect(owner, old);
            }
            if let Some(new) = &item {
                battle.attach_effect(owner, new, None);
            }
        }
        Ok(Transition::applied(item))
    }

    fn announce(
        battle: &mut Battle,
        request: &ItemRequest,
        outcome: &Transition<Option<EffectId>>,
    ) {
        if !outcome.occurred {
            return;
        }
        let message = match &outcome.magnitude {
            Some(item) => {
                let name = battle.data().display_name(RecordKind::Item, item.as_str()).to_string();
                Message::new("item_obtained").arg(name)
            }
            None if request.consumed => Message::new("item_consumed"),
            None => Message::new("item_lost"),
        };
        battle.display_message(&message.subject(request.target));
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &ItemRequest,
        outcome: &Transition<Option<EffectId>>,
    ) -> Hook<()> {
        effect.on_after_item_change(this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<Option<EffectId>>) -> i64 {
        i64::from(outcome.occurred)
    }
}
