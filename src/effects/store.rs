//! Every container of a battle, and the gather order used by dispatch.
//!
//! ## Gather order
//!
//! For a transition targeting combatant `X`:
//!
//! 1. `X`'s own container, in insertion order.
//! 2. Effects of `X`'s active allies that affect allies, allies taken in
//!    switch-in order.
//! 3. The container of `X`'s side.
//! 4. The field container.
//!
//! A wide gather continues with every other live effect: remaining
//! combatants in switch-in order, then side containers by side index, then
//! the field. An instance is gathered at most once.

use rustc_hash::{FxHashMap, FxHashSet};

use super::container::{AddOutcome, EffectContainer};
use super::effect::{EffectHandle, EffectInstance};
use super::id::EffectId;
use crate::core::{BattleState, CombatantId, Owner, SideId};

/// All effect containers of one battle.
#[derive(Debug, Default)]
pub struct EffectStore {
    containers: FxHashMap<Owner, EffectContainer>,
    next_sequence: u64,
}

impl EffectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next insertion number.
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// The container of an owner, if one was ever created.
    #[must_use]
    pub fn container(&self, owner: Owner) -> Option<&EffectContainer> {
        self.containers.get(&owner)
    }

    /// The container of an owner, created on first use.
    pub fn container_mut(&mut self, owner: Owner) -> &mut EffectContainer {
        self.containers
            .entry(owner)
            .or_insert_with(|| EffectContainer::new(owner))
    }

    /// Store an instance under its owner.
    pub fn insert(&mut self, instance: EffectInstance) -> AddOutcome {
        self.container_mut(instance.owner()).add(instance)
    }

    /// The live instance with this identifier on this owner.
    #[must_use]
    pub fn find(&self, owner: Owner, id: &EffectId) -> Option<EffectHandle> {
        self.container(owner)?.get(id).cloned()
    }

    /// Mark an instance dead.
    pub fn remove(&mut self, owner: Owner, id: &EffectId) -> bool {
        self.containers
            .get_mut(&owner)
            .is_some_and(|container| container.remove(id))
    }

    /// Kill and drop every effect of an owner.
    pub fn clear(&mut self, owner: Owner) {
        if let Some(container) = self.containers.get_mut(&owner) {
            container.clear();
        }
    }

    /// Drop instances marked dead in any container.
    pub fn purge_dead(&mut self) -> usize {
        self.containers.values_mut().map(EffectContainer::purge_dead).sum()
    }

    /// Live handles of one container, in insertion order.
    #[must_use]
    pub fn snapshot(&self, owner: Owner) -> Vec<EffectHandle> {
        self.container(owner)
            .map(EffectContainer::snapshot)
            .unwrap_or_default()
    }

    // === Gathering ===

    /// Effects consulted for a transition targeting `target`.
    #[must_use]
    pub fn gather_for(&self, state: &BattleState, target: CombatantId) -> Vec<EffectHandle> {
        let mut gathered = self.snapshot(Owner::Combatant(target));

        for ally in state.allies_of(target) {
            if let Some(container) = self.container(Owner::Combatant(ally)) {
                gathered.extend(container.iter().filter(|e| e.affects_allies()).cloned());
            }
        }

        if let Some(side) = state.side_of(target) {
            gathered.extend(self.snapshot(Owner::Side(side)));
        }
        gathered.extend(self.snapshot(Owner::Field));
        gathered
    }

    /// Effects consulted for a transition on any owner: a combatant gathers
    /// as in [`Self::gather_for`], a side gathers itself then the field, the
    /// field gathers only itself.
    #[must_use]
    pub fn gather_owner(&self, state: &BattleState, owner: Owner) -> Vec<EffectHandle> {
        match owner {
            Owner::Combatant(id) => self.gather_for(state, id),
            Owner::Side(side) => {
                let mut gathered = self.snapshot(Owner::Side(side));
                gathered.extend(self.snapshot(Owner::Field));
                gathered
            }
            Owner::Field => self.snapshot(Owner::Field),
        }
    }

    /// Every live effect, with the focus owner's gather first.
    #[must_use]
    pub fn gather_wide(&self, state: &BattleState, focus: Option<Owner>) -> Vec<EffectHandle> {
        let mut gathered = match focus {
            Some(owner) => self.gather_owner(state, owner),
            None => Vec::new(),
        };
        let mut seen: FxHashSet<u64> = gathered.iter().map(|e| e.sequence()).collect();
        let mut push_all = |container: Option<&EffectContainer>, gathered: &mut Vec<EffectHandle>| {
            for effect in container.into_iter().flat_map(EffectContainer::iter) {
                if seen.insert(effect.sequence()) {
                    gathered.push(effect.clone());
                }
            }
        };

        for &id in state.active() {
            push_all(self.container(Owner::Combatant(id)), &mut gathered);
        }
        for owner in self.benched_owners(state) {
            push_all(self.container(owner), &mut gathered);
        }
        for side in SideId::all(state.side_count()) {
            push_all(self.container(Owner::Side(side)), &mut gathered);
        }
        push_all(self.container(Owner::Field), &mut gathered);
        gathered
    }

    /// Combatant containers of combatants not on the field, by id.
    fn benched_owners(&self, state: &BattleState) -> Vec<Owner> {
        let mut owners: Vec<CombatantId> = self
            .containers
            .iter()
            .filter(|(_, container)| !container.is_empty())
            .filter_map(|(owner, _)| owner.combatant())
            .filter(|&id| !state.is_active(id))
            .collect();
        owners.sort_unstable();
        owners.into_iter().map(Owner::Combatant).collect()
    }

    /// Owners in residual order: the given combatants, then every side,
    /// then the field.
    #[must_use]
    pub fn residual_owners(state: &BattleState, order: &[CombatantId]) -> Vec<Owner> {
        order
            .iter()
            .copied()
            .map(Owner::Combatant)
            .chain(SideId::all(state.side_count()).map(Owner::Side))
            .chain(std::iter::once(Owner::Field))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Combatant;
    use crate::effects::{Effect, NoOpEffect};

    #[derive(Debug)]
    struct AllyAura;

    impl Effect for AllyAura {
        fn affects_allies(&self) -> bool {
            true
        }
    }

    fn add(store: &mut EffectStore, owner: Owner, name: &'static str, behavior: Box<dyn Effect>) {
        let seq = store.next_sequence();
        store.insert(EffectInstance::new(EffectId::new(name), owner, behavior, None, seq));
    }

    fn names(handles: &[EffectHandle]) -> Vec<&str> {
        handles.iter().map(|e| e.id().as_str()).collect()
    }

    fn doubles() -> (BattleState, CombatantId, CombatantId, CombatantId) {
        let mut state = BattleState::new(2);
        let x = state.add_combatant(Combatant::new("X", SideId::new(0), 100)).unwrap();
        let ally = state.add_combatant(Combatant::new("Ally", SideId::new(0), 100)).unwrap();
        let foe = state.add_combatant(Combatant::new("Foe", SideId::new(1), 100)).unwrap();
        state.enter_field(x);
        state.enter_field(foe);
        state.enter_field(ally);
        (state, x, ally, foe)
    }

    #[test]
    fn test_gather_for_order() {
        let (state, x, ally, foe) = doubles();
        let mut store = EffectStore::new();

        add(&mut store, Owner::Field, "field", Box::new(NoOpEffect));
        add(&mut store, Owner::Side(SideId::new(0)), "side", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(ally), "ally_private", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(ally), "ally_aura", Box::new(AllyAura));
        add(&mut store, Owner::Combatant(foe), "foe", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(x), "own_1", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(x), "own_2", Box::new(NoOpEffect));

        let gathered = store.gather_for(&state, x);
        assert_eq!(names(&gathered), vec!["own_1", "own_2", "ally_aura", "side", "field"]);
    }

    #[test]
    fn test_gather_wide_covers_everything_once() {
        let (state, x, ally, foe) = doubles();
        let mut store = EffectStore::new();

        add(&mut store, Owner::Field, "field", Box::new(NoOpEffect));
        add(&mut store, Owner::Side(SideId::new(1)), "foe_side", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(ally), "ally_aura", Box::new(AllyAura));
        add(&mut store, Owner::Combatant(foe), "foe", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(x), "own", Box::new(NoOpEffect));

        let gathered = store.gather_wide(&state, Some(Owner::Combatant(foe)));
        assert_eq!(names(&gathered), vec!["foe", "foe_side", "field", "own", "ally_aura"]);

        let gathered = store.gather_wide(&state, None);
        assert_eq!(names(&gathered), vec!["own", "foe", "ally_aura", "foe_side", "field"]);
    }

    #[test]
    fn test_dead_effects_not_gathered() {
        let (state, x, _, _) = doubles();
        let mut store = EffectStore::new();
        add(&mut store, Owner::Combatant(x), "gone", Box::new(NoOpEffect));
        add(&mut store, Owner::Combatant(x), "kept", Box::new(NoOpEffect));

        assert!(store.remove(Owner::Combatant(x), &EffectId::new("gone")));
        assert_eq!(names(&store.gather_for(&state, x)), vec!["kept"]);
        assert_eq!(store.purge_dead(), 1);
    }

    #[test]
    fn test_residual_owner_order() {
        let (state, x, ally, foe) = doubles();
        let owners = EffectStore::residual_owners(&state, &[foe, x, ally]);
        assert_eq!(
            owners,
            vec![
                Owner::Combatant(foe),
                Owner::Combatant(x),
                Owner::Combatant(ally),
                Owner::Side(SideId::new(0)),
                Owner::Side(SideId::new(1)),
                Owner::Field,
            ]
        );
    }
}
