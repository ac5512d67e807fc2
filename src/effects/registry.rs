//! Identifier to constructor lookup.
//!
//! The `EffectRegistry` turns a stable [`EffectId`] into a fresh
//! [`Effect`]. It is filled once during start-up (see
//! [`crate::catalog::standard_registry`]) and only read afterwards.
//!
//! ## Unknown identifiers
//!
//! Data may name effects that have no implementation yet. `create` never
//! fails: it returns a [`NoOpEffect`] and logs a warning the first time
//! each unknown identifier is seen.
//!
//! ## Example
//!
//! ```
//! use battle_dispatch::core::Owner;
//! use battle_dispatch::effects::{EffectArgs, EffectId, EffectRegistry, NoOpEffect};
//!
//! let mut registry = EffectRegistry::new();
//! registry.register("stand_in", |_| Box::new(NoOpEffect));
//!
//! let args = EffectArgs::new(Owner::Field);
//! let _effect = registry.create(&EffectId::new("stand_in"), &args);
//! let _fallback = registry.create(&EffectId::new("not_yet_implemented"), &args);
//!
//! assert_eq!(registry.unknown_reported(), vec![EffectId::new("not_yet_implemented")]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use rustc_hash::{FxHashMap, FxHashSet};

use super::effect::{Effect, NoOpEffect};
use super::id::EffectId;
use crate::core::{BattleError, Owner};

/// What a constructor is told about the instance it builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectArgs {
    /// The entity the new effect will be about.
    pub owner: Owner,
    /// Countdown requested by the attaching transition, if any.
    pub duration: Option<u32>,
}

impl EffectArgs {
    /// Arguments with no explicit duration.
    #[must_use]
    pub fn new(owner: Owner) -> Self {
        Self { owner, duration: None }
    }

    /// Set the requested duration (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, duration: Option<u32>) -> Self {
        self.duration = duration;
        self
    }
}

/// Builds one effect variant.
pub type Constructor = Arc<dyn Fn(&EffectArgs) -> Box<dyn Effect> + Send + Sync>;

/// Map from identifier to constructor.
#[derive(Default)]
pub struct EffectRegistry {
    constructors: FxHashMap<EffectId, Constructor>,
    /// Order of first registration, for deterministic listing.
    order: Vec<EffectId>,
    reported: Mutex<FxHashSet<EffectId>>,
}

impl EffectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor. Registering an identifier again silently
    /// replaces the earlier constructor.
    pub fn register<F>(&mut self, id: impl Into<EffectId>, constructor: F)
    where
        F: Fn(&EffectArgs) -> Box<dyn Effect> + Send + Sync + 'static,
    {
        let id = id.into();
        if !self.constructors.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.constructors.insert(id, Arc::new(constructor));
    }

    /// Whether a constructor exists for this identifier.
    #[must_use]
    pub fn contains(&self, id: &EffectId) -> bool {
        self.constructors.contains_key(id)
    }

    /// Build a fresh effect, falling back to [`NoOpEffect`].
    #[must_use]
    pub fn create(&self, id: &EffectId, args: &EffectArgs) -> Box<dyn Effect> {
        match self.constructors.get(id) {
            Some(constructor) => constructor(args),
            None => {
                self.report_unknown(id);
                Box::new(NoOpEffect)
            }
        }
    }

    /// Registered identifiers in first-registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &EffectId> {
        self.order.iter()
    }

    /// Number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Unknown identifiers seen by `create` so far, sorted.
    #[must_use]
    pub fn unknown_reported(&self) -> Vec<EffectId> {
        let reported = self.reported.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<EffectId> = reported.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn report_unknown(&self, id: &EffectId) {
        let first = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        if first {
            tracing::warn!(effect = %id, "unknown effect identifier, using a no-op effect");
        }
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("identifiers", &self.order)
            .finish_non_exhaustive()
    }
}

// === Process-wide instance ===

static INSTALLED: OnceLock<Arc<EffectRegistry>> = OnceLock::new();

/// Install the process-wide registry. Succeeds once; the registry is
/// read-only from then on.
pub fn install(registry: EffectRegistry) -> Result<Arc<EffectRegistry>, BattleError> {
    let registry = Arc::new(registry);
    INSTALLED
        .set(Arc::clone(&registry))
        .map_err(|_| BattleError::RegistryAlreadyInstalled)?;
    tracing::debug!(effects = registry.len(), "effect registry installed");
    Ok(registry)
}

/// The process-wide registry, if installed.
#[must_use]
pub fn installed() -> Option<Arc<EffectRegistry>> {
    INSTALLED.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Marker(u8);

    impl Effect for Marker {
        fn default_duration(&self) -> Option<u32> {
            Some(u32::from(self.0))
        }
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = EffectRegistry::new();
        registry.register("marker", |_| Box::new(Marker(3)));

        assert!(registry.contains(&EffectId::new("marker")));
        let effect = registry.create(&EffectId::new("marker"), &EffectArgs::new(Owner::Field));
        assert_eq!(effect.default_duration(), Some(3));
        assert!(registry.unknown_reported().is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = EffectRegistry::new();
        registry.register("marker", |_| Box::new(Marker(1)));
        registry.register("other", |_| Box::new(NoOpEffect));
        registry.register("marker", |_| Box::new(Marker(2)));

        assert_eq!(registry.len(), 2);
        let effect = registry.create(&EffectId::new("marker"), &EffectArgs::new(Owner::Field));
        assert_eq!(effect.default_duration(), Some(2));

        let order: Vec<&str> = registry.identifiers().map(EffectId::as_str).collect();
        assert_eq!(order, vec!["marker", "other"]);
    }

    #[test]
    fn test_constructor_sees_args() {
        let mut registry = EffectRegistry::new();
        registry.register("timed", |args: &EffectArgs| {
            Box::new(Marker(args.duration.map_or(0, |d| d as u8)))
        });
        let args = EffectArgs::new(Owner::Field).with_duration(Some(4));
        let effect = registry.create(&EffectId::new("timed"), &args);
        assert_eq!(effect.default_duration(), Some(4));
    }

    #[test]
    fn test_unknown_falls_back_and_reports_once() {
        let registry = EffectRegistry::new();
        let id = EffectId::new("not_yet_implemented");
        let args = EffectArgs::new(Owner::Field);

        let effect = registry.create(&id, &args);
        let _ = registry.create(&id, &args);

        assert_eq!(registry.unknown_reported(), vec![id]);
        assert_eq!(effect.default_duration(), None);
        assert!(!effect.affects_allies());
    }
}
