//! Ordered per-owner effect containers.
//!
//! A container holds the live effects of one owner (a combatant, a side or
//! the field) in insertion order. Removal only marks an instance dead; the
//! instance is dropped by [`EffectContainer::purge_dead`] once the current
//! dispatch pass is over, so iteration over a snapshot stays stable.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::effect::{EffectHandle, EffectInstance};
use super::id::EffectId;
use crate::core::Owner;

/// Result of [`EffectContainer::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddOutcome {
    /// A new instance was stored.
    Added,
    /// The identifier was already present; its countdown was reset.
    Refreshed,
    /// The identifier was already present and permanent; nothing changed.
    AlreadyPresent,
}

impl AddOutcome {
    /// Whether a new instance now exists.
    #[must_use]
    pub fn is_added(self) -> bool {
        self == AddOutcome::Added
    }
}

/// Live effects of one owner.
///
/// An owner holds at most one live effect per identifier.
///
/// ```
/// use battle_dispatch::core::Owner;
/// use battle_dispatch::effects::{
///     AddOutcome, EffectContainer, EffectId, EffectInstance, NoOpEffect,
/// };
///
/// let mut container = EffectContainer::new(Owner::Field);
/// let make = |seq| {
///     let behavior = Box::new(NoOpEffect);
///     EffectInstance::new(EffectId::new("gravity"), Owner::Field, behavior, Some(5), seq)
/// };
///
/// assert_eq!(container.add(make(0)), AddOutcome::Added);
/// assert_eq!(container.add(make(1)), AddOutcome::Refreshed);
/// assert_eq!(container.len(), 1);
///
/// assert!(container.remove(&EffectId::new("gravity")));
/// assert!(container.is_empty());
/// ```
#[derive(Debug)]
pub struct EffectContainer {
    owner: Owner,
    effects: Vec<EffectHandle>,
}

impl EffectContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            effects: Vec::new(),
        }
    }

    /// The owner this container belongs to.
    #[must_use]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Store an instance, or refresh the live one with the same identifier.
    ///
    /// A refresh takes the new instance's countdown; the existing behavior
    /// and its private state are kept.
    pub fn add(&mut self, instance: EffectInstance) -> AddOutcome {
        if let Some(existing) = self.get(instance.id()) {
            return match instance.remaining() {
                Some(turns) => {
                    existing.set_remaining(Some(turns));
                    AddOutcome::Refreshed
                }
                None => AddOutcome::AlreadyPresent,
            };
        }
        self.effects.push(Rc::new(instance));
        AddOutcome::Added
    }

    /// The live instance with this identifier.
    #[must_use]
    pub fn get(&self, id: &EffectId) -> Option<&EffectHandle> {
        self.effects
            .iter()
            .find(|effect| effect.is_alive() && effect.id() == id)
    }

    /// Whether a live instance with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &EffectId) -> bool {
        self.get(id).is_some()
    }

    /// Mark the instance with this identifier dead. Returns `false` if there
    /// was none.
    pub fn remove(&mut self, id: &EffectId) -> bool {
        match self.get(id) {
            Some(effect) => {
                effect.kill();
                true
            }
            None => false,
        }
    }

    /// Copy the live handles, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EffectHandle> {
        self.iter().cloned().collect()
    }

    /// Iterate live handles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectHandle> {
        self.effects.iter().filter(|effect| effect.is_alive())
    }

    /// Drop dead instances. Returns how many were dropped.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|effect| effect.is_alive());
        before - self.effects.len()
    }

    /// Kill and drop everything. Snapshots taken earlier see the instances
    /// as dead.
    pub fn clear(&mut self) {
        for effect in &self.effects {
            effect.kill();
        }
        self.effects.clear();
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no live instance remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CombatantId, Owner};
    use crate::effects::NoOpEffect;

    fn instance(name: &'static str, duration: Option<u32>, seq: u64) -> EffectInstance {
        let owner = Owner::Combatant(CombatantId(0));
        EffectInstance::new(EffectId::new(name), owner, Box::new(NoOpEffect), duration, seq)
    }

    #[test]
    fn test_insertion_order() {
        let mut container = EffectContainer::new(Owner::Combatant(CombatantId(0)));
        container.add(instance("a", None, 0));
        container.add(instance("b", None, 1));
        container.add(instance("c", None, 2));

        let ids: Vec<_> = container.iter().map(|e| e.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_permanent_is_noop() {
        let mut container = EffectContainer::new(Owner::Field);
        assert_eq!(container.add(instance("a", None, 0)), AddOutcome::Added);
        assert_eq!(container.add(instance("a", None, 1)), AddOutcome::AlreadyPresent);
        assert_eq!(container.len(), 1);
        assert_eq!(container.get(&EffectId::new("a")).unwrap().sequence(), 0);
    }

    #[test]
    fn test_duplicate_timed_refreshes() {
        let mut container = EffectContainer::new(Owner::Field);
        container.add(instance("a", Some(5), 0));
        container.get(&EffectId::new("a")).unwrap().tick();
        assert_eq!(container.get(&EffectId::new("a")).unwrap().remaining(), Some(4));

        assert_eq!(container.add(instance("a", Some(5), 1)), AddOutcome::Refreshed);
        let kept = container.get(&EffectId::new("a")).unwrap();
        assert_eq!(kept.remaining(), Some(5));
        assert_eq!(kept.sequence(), 0);
    }

    #[test]
    fn test_remove_is_deferred() {
        let mut container = EffectContainer::new(Owner::Field);
        container.add(instance("a", None, 0));
        let snapshot = container.snapshot();

        assert!(container.remove(&EffectId::new("a")));
        assert!(!container.remove(&EffectId::new("a")));
        assert!(!container.contains(&EffectId::new("a")));

        // The handle is still reachable through the snapshot, but dead.
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot[0].is_alive());

        assert_eq!(container.purge_dead(), 1);
        assert_eq!(container.purge_dead(), 0);
    }

    #[test]
    fn test_readd_after_remove() {
        let mut container = EffectContainer::new(Owner::Field);
        container.add(instance("a", None, 0));
        container.remove(&EffectId::new("a"));
        assert_eq!(container.add(instance("a", None, 1)), AddOutcome::Added);
        assert_eq!(container.len(), 1);
        assert_eq!(container.get(&EffectId::new("a")).unwrap().sequence(), 1);
    }

    #[test]
    fn test_clear_kills_snapshot_members() {
        let mut container = EffectContainer::new(Owner::Field);
        container.add(instance("a", None, 0));
        container.add(instance("b", None, 1));
        let snapshot = container.snapshot();

        container.clear();
        assert!(container.is_empty());
        assert!(snapshot.iter().all(|e| !e.is_alive()));
    }
}
