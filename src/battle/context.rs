//! The explicit battle context.
//!
//! A `Battle` bundles everything a mediator or hook may touch: the state,
//! every effect container, the registry, static data, the presenter and the
//! RNG. It is passed explicitly into every call; there is no ambient
//! "current battle", so any number of battles can coexist in one process.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::presenter::{NullPresenter, Presenter};
use crate::core::{
    BattleConfig, BattleError, BattleRng, BattleState, Combatant, CombatantId, ElementType,
    Interrupt, Owner, SideId,
};
use crate::data::{DataStore, RecordKind};
use crate::effects::{
    self, AddOutcome, Cue, EffectArgs, EffectHandle, EffectId, EffectInstance, EffectRegistry,
    EffectStore, Message,
};
use crate::rules::BattleResult;

/// One battle in progress.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
///
/// use battle_dispatch::battle::Battle;
/// use battle_dispatch::catalog::standard_registry;
/// use battle_dispatch::core::{BattleConfig, Combatant, SideId};
/// use battle_dispatch::handlers::SwitchHandler;
///
/// let registry = Arc::new(standard_registry().unwrap());
/// let mut battle = Battle::new(BattleConfig::new(2).with_seed(1), registry);
///
/// let hero = battle
///     .add_combatant(Combatant::new("Hero", SideId::new(0), 100).with_ability("intimidate"))
///     .unwrap();
/// SwitchHandler::switch_in(&mut battle, hero).unwrap();
///
/// assert!(battle.state().is_active(hero));
/// assert!(battle.has_effect(hero.into(), &"intimidate".into()));
/// ```
pub struct Battle {
    state: BattleState,
    effects: EffectStore,
    registry: Arc<EffectRegistry>,
    data: Arc<DataStore>,
    presenter: Box<dyn Presenter>,
    rng: BattleRng,
    config: BattleConfig,
    depth: usize,
    result: Option<BattleResult>,
}

impl Battle {
    /// Create a battle using an explicit registry.
    #[must_use]
    pub fn new(config: BattleConfig, registry: Arc<EffectRegistry>) -> Self {
        Self {
            state: BattleState::new(config.side_count),
            effects: EffectStore::new(),
            registry,
            data: Arc::new(DataStore::new()),
            presenter: Box::new(NullPresenter),
            rng: BattleRng::new(config.seed),
            config,
            depth: 0,
            result: None,
        }
    }

    /// Create a battle using the process-wide registry.
    pub fn with_installed_registry(config: BattleConfig) -> Result<Self, BattleError> {
        let registry = effects::installed().ok_or(BattleError::RegistryNotInstalled)?;
        Ok(Self::new(config, registry))
    }

    /// Use this presenter (builder pattern).
    #[must_use]
    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    /// Use this static data (builder pattern).
    #[must_use]
    pub fn with_data(mut self, data: Arc<DataStore>) -> Self {
        self.data = data;
        self
    }

    // === Accessors ===

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// A combatant by id.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.state.combatant(id)
    }

    /// Every effect container.
    #[must_use]
    pub fn effects(&self) -> &EffectStore {
        &self.effects
    }

    /// The registry effects are created from.
    #[must_use]
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Static data lookup.
    #[must_use]
    pub fn data(&self) -> &DataStore {
        &self.data
    }

    /// The battle RNG. Every probability check draws from it.
    pub fn rng(&mut self) -> &mut BattleRng {
        &mut self.rng
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The result, once the battle is over.
    #[must_use]
    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    /// Whether the battle has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// Current mediator nesting.
    #[must_use]
    pub fn dispatch_depth(&self) -> usize {
        self.depth
    }

    /// The live effect with this identifier on this owner.
    #[must_use]
    pub fn effect(&self, owner: Owner, id: &EffectId) -> Option<EffectHandle> {
        self.effects.find(owner, id)
    }

    /// Whether the owner holds a live effect with this identifier.
    #[must_use]
    pub fn has_effect(&self, owner: Owner, id: &EffectId) -> bool {
        self.effects.find(owner, id).is_some()
    }

    /// Activation flag of an effect, for the entity layer. `false` when the
    /// owner does not hold it.
    #[must_use]
    pub fn is_activated(&self, owner: Owner, id: &EffectId) -> bool {
        self.effects.find(owner, id).is_some_and(|effect| effect.is_activated())
    }

    // === Setup ===

    /// Register a combatant. It enters the field through a switch-in.
    pub fn add_combatant(&mut self, combatant: Combatant) -> Result<CombatantId, BattleError> {
        let id = self.state.add_combatant(combatant)?;
        self.effects.container_mut(Owner::Combatant(id));
        Ok(id)
    }

    /// Register a combatant built from a species record: `hp`, `types` and
    /// the default `ability`.
    pub fn add_combatant_from_species(
        &mut self,
        species: &str,
        side: SideId,
    ) -> Result<CombatantId, BattleError> {
        let record = self.data.require(RecordKind::Species, species)?;
        let max_hp = u32::try_from(record.get_int("hp", 1)).unwrap_or(1).max(1);
        let types = record.get_text_list("types").iter().filter_map(|t| ElementType::from_key(t));
        let mut combatant = Combatant::new(record.name.clone(), side, max_hp).with_types(types);
        if let Some(ability) = record.get_text("ability") {
            combatant = combatant.with_ability(EffectId::from(ability.to_string()));
        }
        self.add_combatant(combatant)
    }

    // === Mediator plumbing ===

    pub(crate) fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub(crate) fn effects_mut(&mut self) -> &mut EffectStore {
        &mut self.effects
    }

    /// Fail with the stored result once the battle is over.
    pub(crate) fn ensure_running(&self) -> Result<(), Interrupt> {
        match &self.result {
            Some(result) => Err(Interrupt::BattleEnded(result.clone())),
            None => Ok(()),
        }
    }

    pub(crate) fn enter_dispatch(&mut self) -> Result<(), Interrupt> {
        let limit = self.config.max_dispatch_depth;
        if self.depth >= limit {
            tracing::error!(limit, "reentrant dispatch depth exceeded");
            return Err(BattleError::DispatchDepthExceeded { limit }.into());
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit_dispatch(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Store the result and build the interrupt that carries it.
    pub(crate) fn finish(&mut self, result: BattleResult) -> Interrupt {
        debug!(%result, "battle ended");
        self.result = Some(result.clone());
        Interrupt::BattleEnded(result)
    }

    /// End the battle if at most one side has a combatant left standing.
    pub(crate) fn check_battle_end(&mut self) -> Result<(), Interrupt> {
        let sides: Vec<SideId> = SideId::all(self.state.side_count()).collect();
        let defeated = sides.iter().filter(|&&side| self.state.is_side_defeated(side)).count();
        if defeated == 0 {
            return Ok(());
        }
        let standing: Vec<SideId> = sides
            .into_iter()
            .filter(|&side| !self.state.is_side_defeated(side))
            .collect();
        match standing.as_slice() {
            [] => Err(self.finish(BattleResult::Draw)),
            [winner] => Err(self.finish(BattleResult::Winner(*winner))),
            _ => Ok(()),
        }
    }

    /// Build an effect from the registry and store it under `owner`.
    pub(crate) fn attach_effect(
        &mut self,
        owner: Owner,
        id: &EffectId,
        duration: Option<u32>,
    ) -> AddOutcome {
        let args = EffectArgs::new(owner).with_duration(duration);
        let behavior = self.registry.create(id, &args);
        let sequence = self.effects.next_sequence();
        let instance = EffectInstance::new(id.clone(), owner, behavior, duration, sequence);
        self.effects.insert(instance)
    }

    pub(crate) fn detach_effect(&mut self, owner: Owner, id: &EffectId) -> bool {
        self.effects.remove(owner, id)
    }

    // === Presentation, for mediators only ===

    pub(crate) fn present(&mut self, cues: &[Cue]) {
        for cue in cues {
            match cue {
                Cue::Indicator { combatant, effect } => {
                    self.presenter.show_indicator(*combatant, effect);
                }
                Cue::Message(message) => self.presenter.display_message(message),
            }
        }
    }

    pub(crate) fn show_indicator(&mut self, combatant: CombatantId, effect: &EffectId) {
        self.presenter.show_indicator(combatant, effect);
    }

    pub(crate) fn display_message(&mut self, message: &Message) {
        self.presenter.display_message(message);
    }

    pub(crate) fn wait_for_animation(&mut self) {
        self.presenter.wait_for_animation();
    }
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("state", &self.state)
            .field("effects", &self.effects)
            .field("depth", &self.depth)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}
