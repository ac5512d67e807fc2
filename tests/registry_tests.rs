//! Registry integration tests.
//!
//! Every registered identifier must build an effect that survives a full
//! round of transitions, unknown identifiers degrade to no-ops, and
//! malformed templates are refused while the registry is built.

use std::sync::Arc;

use battle_dispatch::battle::Battle;
use battle_dispatch::catalog::{standard_registry, StatLossGuard, StatusImmunity};
use battle_dispatch::core::{
    BattleConfig, BattleError, Combatant, CombatantId, DamageCategory, ElementType, Interrupt,
    Owner, SideId, Stat, StatusCondition, Terrain, Weather,
};
use battle_dispatch::effects::{install, installed, Effect, EffectArgs, EffectId, EffectRegistry};
use battle_dispatch::handlers::{
    AbilityHandler, AbilityRequest, AttachHandler, AttachRequest, DamageHandler, DamageRequest,
    HealRequest, ItemHandler, ItemRequest, Origin, StatChangeRequest, StatHandler, StatusHandler,
    StatusRequest, SwitchHandler, SwitchRequest, TerrainHandler, TerrainRequest, WeatherHandler,
    WeatherRequest,
};

/// `false` once the battle has ended; a fatal error fails the test.
fn keep_going<T>(outcome: Result<T, Interrupt>, id: &EffectId, step: &str) -> bool {
    match outcome {
        Ok(_) => true,
        Err(Interrupt::BattleEnded(_)) => false,
        Err(Interrupt::Fatal(error)) => panic!("{id} failed at {step}: {error}"),
    }
}

type Step = (&'static str, Box<dyn Fn(&mut Battle) -> Result<(), Interrupt>>);

fn step<F>(name: &'static str, run: F) -> Step
where
    F: Fn(&mut Battle) -> Result<(), Interrupt> + 'static,
{
    (name, Box::new(run))
}

/// One round of every transition kind around a holder of `id`.
fn exercise(
    registry: &Arc<EffectRegistry>,
    id: &EffectId,
    owner_of: impl Fn(CombatantId) -> Owner,
) {
    let mut battle = Battle::new(BattleConfig::new(2).with_seed(11), Arc::clone(registry));
    let holder = battle.add_combatant(Combatant::new("Holder", SideId::new(0), 200)).unwrap();
    let foe = battle.add_combatant(Combatant::new("Foe", SideId::new(1), 200)).unwrap();
    SwitchHandler::switch_in(&mut battle, holder).unwrap();
    SwitchHandler::switch_in(&mut battle, foe).unwrap();

    let owner = owner_of(holder);
    let effect = id.clone();
    let steps = vec![
        step("attach", move |b| {
            AttachHandler::apply(b, AttachRequest::new(owner, effect.clone())).map(drop)
        }),
        step("action", |b| b.begin_action()),
        step("fire contact hit", move |b| {
            let hit = DamageRequest::hit(foe, holder, 10, DamageCategory::Physical)
                .with_element(ElementType::Fire)
                .with_contact();
            DamageHandler::apply(b, hit).map(drop)
        }),
        step("typed hits", move |b| {
            for element in [ElementType::Water, ElementType::Ground, ElementType::Electric] {
                let hit = DamageRequest::hit(foe, holder, 5, DamageCategory::Special)
                    .with_element(element);
                DamageHandler::apply(b, hit)?;
                let back = DamageRequest::hit(holder, foe, 5, DamageCategory::Physical)
                    .with_element(element);
                DamageHandler::apply(b, back)?;
            }
            Ok(())
        }),
        step("stat changes", move |b| {
            let drop_by_foe =
                StatChangeRequest::new(holder, Stat::Attack, -1).with_origin(Origin::by(foe));
            StatHandler::apply(b, drop_by_foe)?;
            StatHandler::apply(b, StatChangeRequest::new(foe, Stat::Speed, 2)).map(drop)
        }),
        step("status", move |b| {
            let burn =
                StatusRequest::inflict(holder, StatusCondition::Burn).with_origin(Origin::by(foe));
            StatusHandler::apply(b, burn)?;
            StatusHandler::apply(b, StatusRequest::cure(holder)).map(drop)
        }),
        step("heal", move |b| DamageHandler::heal(b, HealRequest::new(holder, 15)).map(drop)),
        step("field", |b| {
            WeatherHandler::apply(b, WeatherRequest::set(Weather::Rain))?;
            TerrainHandler::apply(b, TerrainRequest::set(Terrain::Electric))?;
            WeatherHandler::apply(b, WeatherRequest::clear()).map(drop)
        }),
        step("item", move |b| {
            let give = ItemRequest::give(holder, "leftovers").with_origin(Origin::by(foe));
            ItemHandler::apply(b, give)?;
            ItemHandler::apply(b, ItemRequest::take(holder)).map(drop)
        }),
        step("ability", move |b| {
            AbilityHandler::apply(b, AbilityRequest::new(foe, "none")).map(drop)
        }),
        step("end of turn", move |b| b.end_of_turn(&[holder, foe])),
        step("switch", move |b| {
            SwitchHandler::switch_out(b, SwitchRequest::new(holder))?;
            SwitchHandler::switch_in(b, holder).map(drop)
        }),
    ];

    for (step, run) in &steps {
        if !keep_going(run(&mut battle), id, step) {
            return;
        }
    }
    assert_eq!(battle.dispatch_depth(), 0, "{id} left the dispatch depth raised");
}

#[test]
fn test_every_identifier_survives_a_round() {
    let registry = Arc::new(standard_registry().unwrap());
    let ids: Vec<EffectId> = registry.identifiers().cloned().collect();
    assert!(ids.len() > 40);

    for id in &ids {
        exercise(&registry, id, Owner::Combatant);
        exercise(&registry, id, |_| Owner::Side(SideId::new(0)));
        exercise(&registry, id, |_| Owner::Field);
    }
    assert!(registry.unknown_reported().is_empty());
}

#[test]
fn test_identifiers_are_unique() {
    let registry = standard_registry().unwrap();
    let mut ids: Vec<&EffectId> = registry.identifiers().collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(registry.len(), total);
}

#[test]
fn test_field_and_status_keys_registered() {
    let registry = standard_registry().unwrap();
    for terrain in [Terrain::Electric, Terrain::Grassy, Terrain::Misty] {
        assert!(registry.contains(&EffectId::new(terrain.effect_key())));
    }
    for key in ["safeguard", "reflect", "stealth_rock", "flinch"] {
        assert!(registry.contains(&EffectId::new(key)), "{key} missing");
    }
}

#[test]
fn test_unknown_identifier_reported_once() {
    let registry = standard_registry().unwrap();
    let args = EffectArgs::new(Owner::Field);
    let missing = EffectId::new("not_yet_implemented");

    for _ in 0..3 {
        let effect = registry.create(&missing, &args);
        assert!(!effect.is_activated());
    }
    let _ = registry.create(&EffectId::new("also_missing"), &args);

    assert_eq!(
        registry.unknown_reported(),
        vec![EffectId::new("also_missing"), missing]
    );
}

#[test]
fn test_incomplete_templates_rejected() {
    let id = EffectId::new("broken_guard");
    let err = StatLossGuard::new(&id, &[]).unwrap_err();
    assert_eq!(
        err,
        BattleError::IncompleteTemplate {
            id: id.clone(),
            template: "stat loss guard",
            missing: "stats",
        }
    );
    assert!(StatLossGuard::all(&id).is_ok());

    let id = EffectId::new("broken_immunity");
    let err = StatusImmunity::new(&id, &[], "prevents_burn").unwrap_err();
    assert!(matches!(err, BattleError::IncompleteTemplate { missing: "conditions", .. }));
    let err = StatusImmunity::new(&id, &[StatusCondition::Burn], "").unwrap_err();
    assert!(matches!(err, BattleError::IncompleteTemplate { missing: "message key", .. }));
    assert_eq!(
        err.to_string(),
        "effect :broken_immunity (status immunity template) is missing its message key"
    );
}

/// The only test in this binary that touches the process-wide registry.
#[test]
fn test_install_once() {
    let registry = install(standard_registry().unwrap()).unwrap();
    assert!(Arc::ptr_eq(&registry, &installed().unwrap()));

    let again = install(EffectRegistry::new()).unwrap_err();
    assert_eq!(again, BattleError::RegistryAlreadyInstalled);
    assert!(Arc::ptr_eq(&registry, &installed().unwrap()));

    let battle = Battle::with_installed_registry(BattleConfig::new(2)).unwrap();
    assert!(battle.registry().contains(&EffectId::new("intimidate")));
}
