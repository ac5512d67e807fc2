//! Action and turn boundaries.
//!
//! The turn engine calls [`Battle::begin_action`] before each top-level
//! action and [`Battle::end_of_turn`] once every action has resolved.

use tracing::debug;

use super::context::Battle;
use crate::core::{BattleError, CombatantId, Interrupt, SideId};
use crate::effects::{dispatch, EffectHandle, EffectStore};
use crate::rules::BattleResult;

impl Battle {
    /// Mark the start of a top-level action.
    ///
    /// Broadcasts `on_action_start` to every live effect; one-shot flags
    /// reset here.
    pub fn begin_action(&mut self) -> Result<(), Interrupt> {
        self.ensure_running()?;
        self.state_mut().action += 1;
        let effects = self.effects().gather_wide(self.state(), None);
        dispatch(self, &effects, (), |effect, this, battle, _| {
            effect.on_action_start(this, battle)
        })?;
        Ok(())
    }

    /// Run end-of-turn residuals, then count durations down.
    ///
    /// Residual order: the combatants in `order` (each container in
    /// insertion order), then every side, then the field. A veto from a
    /// residual skips the remaining residuals of the same owner. Each
    /// residual, and every mediator call it makes, resolves completely
    /// before the next one starts.
    pub fn end_of_turn(&mut self, order: &[CombatantId]) -> Result<(), Interrupt> {
        self.ensure_running()?;
        let owners = EffectStore::residual_owners(self.state(), order);

        for &owner in &owners {
            let effects = self.effects().snapshot(owner);
            dispatch(self, &effects, (), |effect, this, battle, _| {
                effect.on_residual(this, battle)
            })?;
        }

        let mut expired: Vec<EffectHandle> = Vec::new();
        for &owner in &owners {
            for effect in self.effects().snapshot(owner) {
                if effect.tick() {
                    effect.kill();
                    expired.push(effect);
                }
            }
        }
        for effect in &expired {
            debug!(effect = %effect.id(), owner = %effect.owner(), "effect expired");
            if let Some(mut behavior) = effect.try_behavior() {
                behavior.on_expire(effect, self)?;
            }
        }
        self.effects_mut().purge_dead();

        self.state_mut().turn += 1;
        Ok(())
    }

    /// A side runs away. Ends the battle with [`BattleResult::Fled`]; the
    /// returned interrupt is meant to be propagated with `?`.
    pub fn flee(&mut self, side: SideId) -> Result<(), Interrupt> {
        self.ensure_running()?;
        if side.index() >= self.state().side_count() {
            return Err(BattleError::UnknownSide(side).into());
        }
        Err(self.finish(BattleResult::Fled(side)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::core::{BattleConfig, Combatant, Owner};
    use crate::effects::{abstain, veto, Effect, EffectId, EffectInstance, EffectRegistry, Hook};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Logs residual and expiry calls, optionally vetoing residuals.
    #[derive(Debug)]
    struct Probe {
        name: &'static str,
        log: Log,
        veto_residual: bool,
        duration: Option<u32>,
        activated: bool,
    }

    impl Effect for Probe {
        fn default_duration(&self) -> Option<u32> {
            self.duration
        }

        fn is_activated(&self) -> bool {
            self.activated
        }

        fn on_action_start(&mut self, _this: &EffectInstance, _battle: &mut Battle) -> Hook<()> {
            self.activated = false;
            abstain()
        }

        fn on_residual(&mut self, _this: &EffectInstance, _battle: &mut Battle) -> Hook<()> {
            self.log.borrow_mut().push(format!("residual:{}", self.name));
            if self.veto_residual {
                veto()
            } else {
                abstain()
            }
        }

        fn on_expire(&mut self, _this: &EffectInstance, _battle: &mut Battle) -> Hook<()> {
            self.log.borrow_mut().push(format!("expire:{}", self.name));
            abstain()
        }
    }

    fn probe(
        battle: &mut Battle,
        owner: Owner,
        name: &'static str,
        log: &Log,
        veto_residual: bool,
        duration: Option<u32>,
    ) {
        let seq = battle.effects_mut().next_sequence();
        let behavior = Probe {
            name,
            log: Rc::clone(log),
            veto_residual,
            duration,
            activated: true,
        };
        battle
            .effects_mut()
            .insert(EffectInstance::new(EffectId::new(name), owner, Box::new(behavior), None, seq));
    }

    fn battle() -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(BattleConfig::new(2), Arc::new(EffectRegistry::new()));
        let a = battle.add_combatant(Combatant::new("A", SideId::new(0), 50)).unwrap();
        let b = battle.add_combatant(Combatant::new("B", SideId::new(1), 50)).unwrap();
        battle.state_mut().enter_field(a);
        battle.state_mut().enter_field(b);
        (battle, a, b)
    }

    #[test]
    fn test_residual_order_follows_engine_order() {
        let (mut battle, a, b) = battle();
        let log = Log::default();
        probe(&mut battle, Owner::Field, "field", &log, false, None);
        probe(&mut battle, Owner::Side(SideId::new(1)), "side_b", &log, false, None);
        probe(&mut battle, Owner::Combatant(a), "a", &log, false, None);
        probe(&mut battle, Owner::Combatant(b), "b", &log, false, None);

        battle.end_of_turn(&[b, a]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["residual:b", "residual:a", "residual:side_b", "residual:field"]
        );
        assert_eq!(battle.state().turn, 2);
    }

    #[test]
    fn test_residual_veto_skips_rest_of_owner() {
        let (mut battle, a, b) = battle();
        let log = Log::default();
        probe(&mut battle, Owner::Combatant(a), "a1", &log, true, None);
        probe(&mut battle, Owner::Combatant(a), "a2", &log, false, None);
        probe(&mut battle, Owner::Combatant(b), "b1", &log, false, None);

        battle.end_of_turn(&[a, b]).unwrap();
        assert_eq!(*log.borrow(), vec!["residual:a1", "residual:b1"]);
    }

    #[test]
    fn test_durations_expire() {
        let (mut battle, a, _) = battle();
        let log = Log::default();
        probe(&mut battle, Owner::Combatant(a), "short", &log, false, Some(1));
        probe(&mut battle, Owner::Combatant(a), "long", &log, false, Some(2));

        battle.end_of_turn(&[a]).unwrap();
        assert!(!battle.has_effect(Owner::Combatant(a), &EffectId::new("short")));
        assert!(battle.has_effect(Owner::Combatant(a), &EffectId::new("long")));
        assert!(log.borrow().contains(&"expire:short".to_string()));

        log.borrow_mut().clear();
        battle.end_of_turn(&[a]).unwrap();
        assert_eq!(*log.borrow(), vec!["residual:long", "expire:long"]);
    }

    #[test]
    fn test_begin_action_resets_flags() {
        let (mut battle, a, _) = battle();
        let log = Log::default();
        probe(&mut battle, Owner::Combatant(a), "flag", &log, false, None);
        assert!(battle.is_activated(Owner::Combatant(a), &EffectId::new("flag")));

        battle.begin_action().unwrap();
        assert_eq!(battle.state().action, 1);
        assert!(!battle.is_activated(Owner::Combatant(a), &EffectId::new("flag")));
    }

    #[test]
    fn test_flee_ends_battle() {
        let (mut battle, _, _) = battle();
        let err = battle.flee(SideId::new(1)).unwrap_err();
        assert_eq!(err, Interrupt::BattleEnded(BattleResult::Fled(SideId::new(1))));
        assert_eq!(battle.result(), Some(&BattleResult::Fled(SideId::new(1))));

        // Nothing runs after the end.
        assert!(battle.begin_action().is_err());
        assert!(battle.end_of_turn(&[]).is_err());
    }

    #[test]
    fn test_flee_unknown_side() {
        let (mut battle, _, _) = battle();
        let err = battle.flee(SideId::new(5)).unwrap_err();
        assert_eq!(err, Interrupt::Fatal(BattleError::UnknownSide(SideId::new(5))));
        assert!(!battle.is_over());
    }
}
