//! The effect contract and live effect instances.
//!
//! An [`Effect`] is the behavior: a value implementing whichever hooks it
//! cares about. An [`EffectInstance`] is that behavior attached to an owner
//! with the bookkeeping every effect shares (identifier, owner, countdown,
//! liveness, insertion order).
//!
//! ## Hook parameters
//!
//! Every hook receives:
//! - `this`: the instance the hook runs for (its id, owner, countdown).
//!   Effects may [`kill`](EffectInstance::kill) themselves through it.
//! - `battle`: the explicit battle context. Hooks read state from it and
//!   request transitions through the mediators in [`crate::handlers`].
//! - the request under consideration and, for "pre" hooks, the running
//!   value as it stands after every earlier effect.
//!
//! "Post" hooks (`on_after_*`, `on_switch_*`) run after every transition,
//! including vetoed and zero-magnitude ones. They receive the
//! [`Transition`] and must check `occurred` before reacting.
//!
//! ## Reentrancy
//!
//! A hook may call a mediator, which dispatches again. An effect whose hook
//! is still on the call stack is skipped by nested dispatches; it cannot
//! observe the transition it is in the middle of causing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::hook::{abstain, Hook};
use super::id::EffectId;
use crate::battle::Battle;
use crate::core::{CombatantId, Owner, StatusCondition, Terrain, Weather};
use crate::handlers::{
    AbilityRequest, AttachRequest, DamageRequest, HealRequest, ItemRequest, StatChangeRequest,
    StatusRequest, SwitchRequest, TerrainRequest, Transition, WeatherRequest,
};

/// Behavior of one standing rule.
///
/// Every hook defaults to abstaining; implement only what the rule needs.
#[allow(unused_variables)]
pub trait Effect: fmt::Debug {
    // === Metadata ===

    /// Whether this effect, held by a combatant, is also consulted for
    /// transitions targeting that combatant's allies.
    fn affects_allies(&self) -> bool {
        false
    }

    /// Countdown used when the attaching request names none. `None` means
    /// the effect stays until removed.
    fn default_duration(&self) -> Option<u32> {
        None
    }

    /// Activation flag readable by the entity layer (flash fire's boost).
    fn is_activated(&self) -> bool {
        false
    }

    // === Lifecycle ===

    /// A new top-level action starts. One-shot flags reset here.
    fn on_action_start(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        abstain()
    }

    /// End-of-turn residual.
    fn on_residual(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        abstain()
    }

    /// The countdown reached zero; the instance is already dead.
    fn on_expire(&mut self, this: &EffectInstance, battle: &mut Battle) -> Hook<()> {
        abstain()
    }

    // === HP ===

    /// Offensive modifier, consulted on the source's own effects.
    fn modify_damage_dealt(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        abstain()
    }

    /// Defensive modifier or immunity, consulted on the target's effects.
    fn modify_damage_taken(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        amount: u32,
    ) -> Hook<u32> {
        abstain()
    }

    fn on_after_damage(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &DamageRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        abstain()
    }

    fn modify_heal(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &HealRequest,
        amount: u32,
    ) -> Hook<u32> {
        abstain()
    }

    fn on_after_heal(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &HealRequest,
        outcome: &Transition<u32>,
    ) -> Hook<()> {
        abstain()
    }

    /// A combatant fainted. Broadcast to every live effect, the fainted
    /// combatant's own included.
    fn on_faint(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        fainted: CombatantId,
    ) -> Hook<()> {
        abstain()
    }

    // === Stat stages ===

    fn modify_stat_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        delta: i8,
    ) -> Hook<i8> {
        abstain()
    }

    fn on_after_stat_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatChangeRequest,
        outcome: &Transition<i8>,
    ) -> Hook<()> {
        abstain()
    }

    // === Status conditions ===

    /// `status` is the condition about to be set; `None` is a cure.
    fn modify_status(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatusRequest,
        status: Option<StatusCondition>,
    ) -> Hook<Option<StatusCondition>> {
        abstain()
    }

    fn on_after_status(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &StatusRequest,
        outcome: &Transition<Option<StatusCondition>>,
    ) -> Hook<()> {
        abstain()
    }

    // === Switching ===

    /// Veto to trap the outgoing combatant. Not consulted for forced
    /// switches or for switch-ins with nobody leaving.
    fn on_before_switch_out(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
    ) -> Hook<()> {
        abstain()
    }

    /// The holder is still on the field while this runs.
    fn on_switch_out(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        abstain()
    }

    fn on_switch_in(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &SwitchRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        abstain()
    }

    // === Held item ===

    fn modify_item_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &ItemRequest,
        item: Option<&EffectId>,
    ) -> Hook<Option<EffectId>> {
        abstain()
    }

    fn on_after_item_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &ItemRequest,
        outcome: &Transition<Option<EffectId>>,
    ) -> Hook<()> {
        abstain()
    }

    // === Ability ===

    fn modify_ability_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AbilityRequest,
        ability: &EffectId,
    ) -> Hook<EffectId> {
        abstain()
    }

    fn on_after_ability_change(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AbilityRequest,
        outcome: &Transition<EffectId>,
    ) -> Hook<()> {
        abstain()
    }

    // === Field ===

    fn modify_weather(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &WeatherRequest,
        weather: Option<Weather>,
    ) -> Hook<Option<Weather>> {
        abstain()
    }

    fn on_after_weather(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &WeatherRequest,
        outcome: &Transition<Option<Weather>>,
    ) -> Hook<()> {
        abstain()
    }

    fn modify_terrain(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &TerrainRequest,
        terrain: Option<Terrain>,
    ) -> Hook<Option<Terrain>> {
        abstain()
    }

    fn on_after_terrain(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &TerrainRequest,
        outcome: &Transition<Option<Terrain>>,
    ) -> Hook<()> {
        abstain()
    }

    // === Volatile / side / field conditions ===

    fn on_before_attach(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AttachRequest,
    ) -> Hook<()> {
        abstain()
    }

    fn on_after_attach(
        &mut self,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &AttachRequest,
        outcome: &Transition<()>,
    ) -> Hook<()> {
        abstain()
    }
}

/// The effect unknown identifiers resolve to. Every hook abstains.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEffect;

impl Effect for NoOpEffect {}

/// Shared handle to a live instance. Containers and dispatch snapshots hold
/// these; a snapshot keeps an instance reachable after its container
/// dropped it.
pub type EffectHandle = Rc<EffectInstance>;

/// An effect attached to an owner.
pub struct EffectInstance {
    id: EffectId,
    owner: Owner,
    affects_allies: bool,
    sequence: u64,
    alive: Cell<bool>,
    remaining: Cell<Option<u32>>,
    behavior: RefCell<Box<dyn Effect>>,
}

impl EffectInstance {
    /// Wrap a behavior. `sequence` is the battle-wide insertion number used
    /// to break ordering ties.
    #[must_use]
    pub fn new(
        id: EffectId,
        owner: Owner,
        behavior: Box<dyn Effect>,
        duration: Option<u32>,
        sequence: u64,
    ) -> Self {
        let duration = duration.or_else(|| behavior.default_duration());
        Self {
            id,
            owner,
            affects_allies: behavior.affects_allies(),
            sequence,
            alive: Cell::new(true),
            remaining: Cell::new(duration),
            behavior: RefCell::new(behavior),
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &EffectId {
        &self.id
    }

    /// The entity this effect is about.
    #[must_use]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// The owning combatant, for effects held by one.
    #[must_use]
    pub fn holder(&self) -> Option<CombatantId> {
        self.owner.combatant()
    }

    /// Whether allies of the holder also consult this effect.
    #[must_use]
    pub fn affects_allies(&self) -> bool {
        self.affects_allies
    }

    /// Battle-wide insertion number.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether the instance still participates in dispatch.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Schedule removal. The container drops the instance after the current
    /// dispatch pass; hooks stop being invoked immediately.
    pub fn kill(&self) {
        self.alive.set(false);
    }

    /// Turns left, `None` for permanent effects.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.remaining.get()
    }

    /// Replace the countdown.
    pub fn set_remaining(&self, turns: Option<u32>) {
        self.remaining.set(turns);
    }

    /// Count one turn down. Returns `true` when this tick expired the effect.
    pub(crate) fn tick(&self) -> bool {
        match self.remaining.get() {
            Some(turns) if turns <= 1 => {
                self.remaining.set(Some(0));
                true
            }
            Some(turns) => {
                self.remaining.set(Some(turns - 1));
                false
            }
            None => false,
        }
    }

    /// Read the activation flag without dispatching. Returns `false` while
    /// the effect is mid-hook.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.behavior
            .try_borrow()
            .map(|behavior| behavior.is_activated())
            .unwrap_or(false)
    }

    /// Borrow the behavior for a hook call; `None` if it is already running
    /// one further up the stack.
    pub(crate) fn try_behavior(&self) -> Option<std::cell::RefMut<'_, Box<dyn Effect>>> {
        self.behavior.try_borrow_mut().ok()
    }
}

impl fmt::Debug for EffectInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectInstance")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("sequence", &self.sequence)
            .field("alive", &self.alive.get())
            .field("remaining", &self.remaining.get())
            .finish()
    }
}
