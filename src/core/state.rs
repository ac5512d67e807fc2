//! Battle state: combatants, rosters, the active lineup, and the field.
//!
//! `BattleState` is plain data. It is mutated only by the mediators in
//! [`crate::handlers`]; effects read it freely but change it by issuing
//! mediator requests.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::{CombatantId, Owner};
use super::error::BattleError;
use super::side::{SideId, SideMap};
use super::stats::{ElementType, StatStages, StatusCondition, Terrain, Weather};
use crate::effects::EffectId;

/// One creature taking part in the battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Assigned by [`BattleState::add_combatant`].
    pub id: CombatantId,
    pub side: SideId,
    pub name: String,
    pub types: SmallVec<[ElementType; 2]>,
    pub hp: u32,
    pub max_hp: u32,
    pub stages: StatStages,
    pub status: Option<StatusCondition>,
    pub ability: EffectId,
    pub item: Option<EffectId>,
    /// Set once the faint sequence has run.
    pub fainted: bool,
}

impl Combatant {
    /// Create a combatant at full HP with no ability, item or status.
    #[must_use]
    pub fn new(name: impl Into<String>, side: SideId, max_hp: u32) -> Self {
        Self {
            id: CombatantId(0),
            side,
            name: name.into(),
            types: SmallVec::new(),
            hp: max_hp,
            max_hp,
            stages: StatStages::default(),
            status: None,
            ability: EffectId::none(),
            item: None,
            fainted: false,
        }
    }

    /// Set the elemental types (builder pattern).
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = ElementType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Set the ability identifier (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: impl Into<EffectId>) -> Self {
        self.ability = ability.into();
        self
    }

    /// Set the held item (builder pattern).
    #[must_use]
    pub fn with_item(mut self, item: impl Into<EffectId>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Start with a non-volatile status (builder pattern).
    #[must_use]
    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Set current HP, clamped to max (builder pattern).
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    /// Whether the combatant has the given type.
    #[must_use]
    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    /// `max_hp / divisor`, never less than 1.
    #[must_use]
    pub fn fraction_of_max(&self, divisor: u32) -> u32 {
        (self.max_hp / divisor.max(1)).max(1)
    }

    /// Whether HP has reached zero.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.hp == 0
    }
}

/// Shared field conditions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub weather: Option<Weather>,
    pub terrain: Option<Terrain>,
}

/// Category of a state transition, one per mediator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Damage,
    Heal,
    Faint,
    StatChange,
    Status,
    SwitchIn,
    SwitchOut,
    Item,
    Ability,
    Weather,
    Terrain,
    Attach,
}

/// A completed transition, kept in order for inspection and replays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Top-level action the transition belongs to.
    pub action: u32,
    pub kind: TransitionKind,
    pub target: Owner,
    /// `false` when vetoed or a no-op.
    pub occurred: bool,
    /// Signed magnitude (damage dealt, stages moved, HP restored...).
    pub magnitude: i64,
}

/// Complete simulation state for one battle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleState {
    combatants: FxHashMap<CombatantId, Combatant>,

    /// Combatants per side in registration order.
    rosters: SideMap<Vec<CombatantId>>,

    /// Combatants on the field, in switch-in order.
    active: Vec<CombatantId>,

    /// Weather and terrain.
    pub field: FieldState,

    /// Turn number (starts at 1).
    pub turn: u32,

    /// Top-level action counter, advanced by `Battle::begin_action`.
    pub action: u32,

    history: Vector<TransitionRecord>,

    next_id: u32,
}

impl BattleState {
    /// Create an empty state.
    #[must_use]
    pub fn new(side_count: usize) -> Self {
        Self {
            combatants: FxHashMap::default(),
            rosters: SideMap::with_default(side_count),
            active: Vec::new(),
            field: FieldState::default(),
            turn: 1,
            action: 0,
            history: Vector::new(),
            next_id: 0,
        }
    }

    /// Number of sides.
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.rosters.side_count()
    }

    // === Combatants ===

    /// Register a combatant on its side's roster and return its ID.
    ///
    /// Registration does not put it on the field; that is a switch-in.
    pub fn add_combatant(&mut self, mut combatant: Combatant) -> Result<CombatantId, BattleError> {
        let id = CombatantId(self.next_id);
        combatant.id = id;
        let roster = self
            .rosters
            .get_mut(combatant.side)
            .ok_or(BattleError::UnknownSide(combatant.side))?;
        roster.push(id);
        self.next_id += 1;
        self.combatants.insert(id, combatant);
        Ok(id)
    }

    /// Get a combatant.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Get a combatant mutably.
    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Get a combatant or fail with `UnknownCombatant`.
    pub fn require(&self, id: CombatantId) -> Result<&Combatant, BattleError> {
        self.combatants.get(&id).ok_or(BattleError::UnknownCombatant(id))
    }

    /// Mutable variant of [`Self::require`].
    pub fn require_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, BattleError> {
        self.combatants
            .get_mut(&id)
            .ok_or(BattleError::UnknownCombatant(id))
    }

    /// Side of a combatant.
    #[must_use]
    pub fn side_of(&self, id: CombatantId) -> Option<SideId> {
        self.combatants.get(&id).map(|c| c.side)
    }

    /// All combatants registered for a side.
    #[must_use]
    pub fn roster(&self, side: SideId) -> &[CombatantId] {
        self.rosters.get(side).map(Vec::as_slice).unwrap_or_default()
    }

    // === Field lineup ===

    /// Combatants on the field, in switch-in order.
    #[must_use]
    pub fn active(&self) -> &[CombatantId] {
        &self.active
    }

    /// Whether a combatant is on the field.
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.active.contains(&id)
    }

    /// Active combatants on the same side, excluding `id` itself.
    #[must_use]
    pub fn allies_of(&self, id: CombatantId) -> Vec<CombatantId> {
        let Some(side) = self.side_of(id) else {
            return Vec::new();
        };
        self.active
            .iter()
            .copied()
            .filter(|&other| other != id && self.side_of(other) == Some(side))
            .collect()
    }

    /// Active combatants on every other side.
    #[must_use]
    pub fn opponents_of(&self, id: CombatantId) -> Vec<CombatantId> {
        let Some(side) = self.side_of(id) else {
            return Vec::new();
        };
        self.active
            .iter()
            .copied()
            .filter(|&other| self.side_of(other).is_some_and(|s| s != side))
            .collect()
    }

    /// Whether two combatants are on opposing sides.
    #[must_use]
    pub fn are_opponents(&self, a: CombatantId, b: CombatantId) -> bool {
        match (self.side_of(a), self.side_of(b)) {
            (Some(x), Some(y)) => x != y,
            _ => false,
        }
    }

    pub(crate) fn enter_field(&mut self, id: CombatantId) {
        if !self.active.contains(&id) {
            self.active.push(id);
        }
    }

    pub(crate) fn leave_field(&mut self, id: CombatantId) {
        self.active.retain(|&other| other != id);
    }

    // === Outcome ===

    /// A side is defeated once every combatant on its roster is at 0 HP.
    /// An empty roster is never defeated.
    #[must_use]
    pub fn is_side_defeated(&self, side: SideId) -> bool {
        let roster = self.roster(side);
        !roster.is_empty()
            && roster
                .iter()
                .all(|id| self.combatants.get(id).map_or(true, Combatant::is_down))
    }

    // === History ===

    /// Append a transition record.
    pub fn record(&mut self, record: TransitionRecord) {
        self.history.push_back(record);
    }

    /// All recorded transitions, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<TransitionRecord> {
        &self.history
    }
}
