//! The effect catalog.
//!
//! Concrete abilities, items, status conditions and side/field conditions,
//! and the one function that registers all of them.
//!
//! ## Registration
//!
//! [`standard_registry`] registers every identifier in a fixed order:
//! abilities, items, statuses, side conditions, field conditions. Template
//! families are validated while the registry is built; a malformed
//! template fails the whole build instead of misbehaving mid-battle.
//!
//! ```
//! use battle_dispatch::catalog::standard_registry;
//! use battle_dispatch::effects::EffectId;
//!
//! let registry = standard_registry().unwrap();
//! assert!(registry.contains(&EffectId::new("intimidate")));
//! assert_eq!(registry.identifiers().next(), Some(&EffectId::none()));
//! ```

mod abilities;
mod conditions;
mod items;
mod statuses;
mod templates;

pub use abilities::{
    ArenaTrap, Defiant, FieldSetting, FlashFire, InnerFocus, Intimidate, Levitate, NaturalCure,
    Opportunist, RoughSkin, SetsField, Static, StickyHold, WaterAbsorb,
};
pub use conditions::{
    ElectricTerrain, GrassyTerrain, MistyTerrain, Reflect, Safeguard, Sandstorm, StealthRock,
    WeatherBoost,
};
pub use items::{AbilityShield, FocusSash, Leftovers, LifeOrb, SitrusBerry};
pub use statuses::{Burn, Flinch, Freeze, Paralysis, Poison, Sleep, Toxic};
pub use templates::{StatLossGuard, StatusImmunity};

use crate::core::{BattleError, Stat, StatusCondition, Terrain, Weather};
use crate::data::{DataRecord, DataStore, RecordKind};
use crate::effects::{Effect, EffectId, EffectRegistry, NoOpEffect};

/// `amount * numerator / denominator`, saturating at `u32::MAX`.
pub(crate) fn scale(amount: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(amount) * u64::from(numerator) / u64::from(denominator.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Register an effect whose fresh instances are clones of `prototype`.
fn add<E>(registry: &mut EffectRegistry, id: &'static str, prototype: E)
where
    E: Effect + Clone + Send + Sync + 'static,
{
    registry.register(id, move |_| Box::new(prototype.clone()));
}

/// Build the registry with every catalog effect.
pub fn standard_registry() -> Result<EffectRegistry, BattleError> {
    let mut registry = EffectRegistry::new();
    add(&mut registry, "none", NoOpEffect);
    register_abilities(&mut registry)?;
    register_items(&mut registry);
    register_statuses(&mut registry);
    register_side_conditions(&mut registry);
    register_field_conditions(&mut registry);
    tracing::debug!(effects = registry.len(), "standard registry built");
    Ok(registry)
}

fn register_abilities(registry: &mut EffectRegistry) -> Result<(), BattleError> {
    add(registry, "intimidate", Intimidate);

    let guards: [(&'static str, &[Stat]); 4] = [
        ("clear_body", &Stat::ALL),
        ("white_smoke", &Stat::ALL),
        ("hyper_cutter", &[Stat::Attack]),
        ("keen_eye", &[Stat::Accuracy]),
    ];
    for (id, stats) in guards {
        let guard = StatLossGuard::new(&EffectId::new(id), stats)?;
        add(registry, id, guard);
    }

    add(registry, "flash_fire", FlashFire::default());
    add(registry, "rough_skin", RoughSkin::default());
    add(registry, "static", Static);
    add(registry, "defiant", Defiant);
    add(registry, "opportunist", Opportunist::default());
    add(registry, "drought", SetsField::new(FieldSetting::Weather(Weather::Sun)));
    add(registry, "drizzle", SetsField::new(FieldSetting::Weather(Weather::Rain)));
    add(registry, "sand_stream", SetsField::new(FieldSetting::Weather(Weather::Sandstorm)));
    add(registry, "electric_surge", SetsField::new(FieldSetting::Terrain(Terrain::Electric)));
    add(registry, "natural_cure", NaturalCure);
    add(registry, "sticky_hold", StickyHold);
    add(registry, "inner_focus", InnerFocus);
    add(registry, "levitate", Levitate);
    add(registry, "water_absorb", WaterAbsorb);
    add(registry, "arena_trap", ArenaTrap);

    let immunities: [(&'static str, &[StatusCondition], &'static str); 7] = [
        ("limber", &[StatusCondition::Paralysis], "prevents_paralysis"),
        ("insomnia", &[StatusCondition::Sleep], "prevents_sleep"),
        ("vital_spirit", &[StatusCondition::Sleep], "prevents_sleep"),
        ("immunity", &[StatusCondition::Poison, StatusCondition::Toxic], "prevents_poison"),
        ("water_veil", &[StatusCondition::Burn], "prevents_burn"),
        ("magma_armor", &[StatusCondition::Freeze], "prevents_freeze"),
        ("pastel_veil", &[StatusCondition::Poison, StatusCondition::Toxic], "prevents_poison"),
    ];
    for (id, conditions, message) in immunities {
        let mut immunity = StatusImmunity::new(&EffectId::new(id), conditions, message)?;
        if id == "pastel_veil" {
            immunity = immunity.for_allies();
        }
        add(registry, id, immunity);
    }
    Ok(())
}

fn register_items(registry: &mut EffectRegistry) {
    add(registry, "leftovers", Leftovers);
    add(registry, "sitrus_berry", SitrusBerry);
    add(registry, "focus_sash", FocusSash::default());
    add(registry, "life_orb", LifeOrb);
    add(registry, "ability_shield", AbilityShield);
}

fn register_statuses(registry: &mut EffectRegistry) {
    add(registry, "burn", Burn);
    add(registry, "poison", Poison);
    add(registry, "toxic", Toxic::default());
    add(registry, "paralysis", Paralysis);
    add(registry, "sleep", Sleep::default());
    add(registry, "freeze", Freeze);
    add(registry, "flinch", Flinch);
}

fn register_side_conditions(registry: &mut EffectRegistry) {
    add(registry, "safeguard", Safeguard);
    add(registry, "reflect", Reflect);
    add(registry, "stealth_rock", StealthRock);
}

fn register_field_conditions(registry: &mut EffectRegistry) {
    add(registry, "sunny_day", WeatherBoost::sun());
    add(registry, "rain_dance", WeatherBoost::rain());
    add(registry, "sandstorm", Sandstorm);
    add(registry, "electric_terrain", ElectricTerrain);
    add(registry, "grassy_terrain", GrassyTerrain);
    add(registry, "misty_terrain", MistyTerrain);
}

/// Display names and flags for the catalog, plus a handful of species.
#[must_use]
pub fn standard_data() -> DataStore {
    let abilities = [
        ("intimidate", "Intimidate"),
        ("clear_body", "Clear Body"),
        ("flash_fire", "Flash Fire"),
        ("levitate", "Levitate"),
        ("static", "Static"),
        ("rough_skin", "Rough Skin"),
        ("insomnia", "Insomnia"),
        ("limber", "Limber"),
    ];
    let items = [
        ("leftovers", "Leftovers", false),
        ("sitrus_berry", "Sitrus Berry", true),
        ("focus_sash", "Focus Sash", true),
        ("life_orb", "Life Orb", false),
        ("ability_shield", "Ability Shield", false),
    ];
    let species: [(&str, &str, i32, &[&str], &str); 4] = [
        ("gyarados", "Gyarados", 95, &["water", "flying"], "intimidate"),
        ("metagross", "Metagross", 80, &["steel", "psychic"], "clear_body"),
        ("vulpix", "Vulpix", 38, &["fire"], "flash_fire"),
        ("pikachu", "Pikachu", 35, &["electric"], "static"),
    ];

    let abilities = abilities
        .into_iter()
        .map(|(key, name)| DataRecord::new(RecordKind::Ability, key, name));
    let items = items.into_iter().map(|(key, name, consumable)| {
        DataRecord::new(RecordKind::Item, key, name).with_attr("consumable", consumable)
    });
    let species = species.into_iter().map(|(key, name, hp, types, ability)| {
        DataRecord::new(RecordKind::Species, key, name)
            .with_attr("hp", hp)
            .with_attr("types", types)
            .with_attr("ability", ability)
    });
    abilities.chain(items).chain(species).collect()
}
