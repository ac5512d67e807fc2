//! Weather and terrain.
//!
//! Both are a single optional condition on the field, implemented by one
//! field effect with a turn countdown. They share one mediator,
//! parameterized by the slot of [`FieldState`] it writes.

use std::fmt;
use std::marker::PhantomData;

use super::{run, Mediator, Origin, Transition};
use crate::battle::Battle;
use crate::core::{FieldState, Interrupt, Owner, Terrain, TransitionKind, Weather};
use crate::effects::{dispatch, Dispatch, Effect, EffectId, EffectInstance, Hook, Message};

/// Turns a weather or terrain lasts unless the request says otherwise.
pub const DEFAULT_FIELD_DURATION: u32 = 5;

/// A request to set (`Some`) or end (`None`) a field condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRequest<C> {
    pub condition: Option<C>,
    /// Turns before the condition expires; [`DEFAULT_FIELD_DURATION`] when
    /// unset.
    pub duration: Option<u32>,
    pub origin: Origin,
}

pub type WeatherRequest = FieldRequest<Weather>;
pub type TerrainRequest = FieldRequest<Terrain>;

impl<C> FieldRequest<C> {
    /// Start a condition.
    #[must_use]
    pub fn set(condition: C) -> Self {
        Self {
            condition: Some(condition),
            duration: None,
            origin: Origin::passive(),
        }
    }

    /// End whatever condition is in place.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            condition: None,
            duration: None,
            origin: Origin::passive(),
        }
    }

    /// Override the duration (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }

    /// Set the originator (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// One slot of the field state, and the hooks that watch it.
pub(crate) trait FieldSlot: Copy + PartialEq + fmt::Debug + 'static {
    const KIND: TransitionKind;
    const STARTED: &'static str;
    const ENDED: &'static str;

    fn effect_key(self) -> &'static str;

    fn read(field: &FieldState) -> Option<Self>;

    fn write(field: &mut FieldState, value: Option<Self>);

    fn modify(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &FieldRequest<Self>,
        value: Option<Self>,
    ) -> Hook<Option<Self>>;

    fn after(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &FieldRequest<Self>,
        outcome: &Transition<Option<Self>>,
    ) -> Hook<()>;
}

impl FieldSlot for Weather {
    const KIND: TransitionKind = TransitionKind::Weather;
    const STARTED: &'static str = "weather_started";
    const ENDED: &'static str = "weather_ended";

    fn effect_key(self) -> &'static str {
        Weather::effect_key(self)
    }

    fn read(field: &FieldState) -> Option<Self> {
        field.weather
    }

    fn write(field: &mut FieldState, value: Option<Self>) {
        field.weather = value;
    }

    fn modify(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &WeatherRequest,
        value: Option<Self>,
    ) -> Hook<Option<Self>> {
        effect.modify_weather(this, battle, request, value)
    }

    fn after(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &WeatherRequest,
        outcome: &Transition<Option<Self>>,
    ) -> Hook<()> {
        effect.on_after_weather(this, battle, request, outcome)
    }
}

impl FieldSlot for Terrain {
    const KIND: TransitionKind = TransitionKind::Terrain;
    const STARTED: &'static str = "terrain_started";
    const ENDED: &'static str = "terrain_ended";

    fn effect_key(self) -> &'static str {
        Terrain::effect_key(self)
    }

    fn read(field: &FieldState) -> Option<Self> {
        field.terrain
    }

    fn write(field: &mut FieldState, value: Option<Self>) {
        field.terrain = value;
    }

    fn modify(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &TerrainRequest,
        value: Option<Self>,
    ) -> Hook<Option<Self>> {
        effect.modify_terrain(this, battle, request, value)
    }

    fn after(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &TerrainRequest,
        outcome: &Transition<Option<Self>>,
    ) -> Hook<()> {
        effect.on_after_terrain(this, battle, request, outcome)
    }
}

/// Mediator for weather. Setting the weather already in place is a no-op
/// and does not reset its countdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeatherHandler;

impl WeatherHandler {
    pub fn apply(
        battle: &mut Battle,
        request: WeatherRequest,
    ) -> Result<Transition<Option<Weather>>, Interrupt> {
        run::<FieldChange<Weather>>(battle, &request)
    }
}

/// Mediator for terrain. Same rules as [`WeatherHandler`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TerrainHandler;

impl TerrainHandler {
    pub fn apply(
        battle: &mut Battle,
        request: TerrainRequest,
    ) -> Result<Transition<Option<Terrain>>, Interrupt> {
        run::<FieldChange<Terrain>>(battle, &request)
    }
}

struct FieldChange<C>(PhantomData<C>);

impl<C: FieldSlot> Mediator for FieldChange<C> {
    type Request = FieldRequest<C>;
    type Value = Option<C>;

    const KIND: TransitionKind = C::KIND;
    const ANIMATED: bool = true;

    fn target(_request: &FieldRequest<C>) -> Owner {
        Owner::Field
    }

    fn origin(request: &FieldRequest<C>) -> &Origin {
        &request.origin
    }

    fn initial(_battle: &Battle, request: &FieldRequest<C>) -> Result<Option<C>, Interrupt> {
        Ok(request.condition)
    }

    fn current(battle: &Battle, _request: &FieldRequest<C>) -> Option<C> {
        C::read(&battle.state().field)
    }

    /// Anything on the field may care about the weather.
    fn pre(
        battle: &mut Battle,
        request: &FieldRequest<C>,
        initial: Option<C>,
    ) -> Result<Dispatch<Option<C>>, Interrupt> {
        let effects = battle.effects().gather_wide(battle.state(), Some(Owner::Field));
        dispatch(battle, &effects, initial, |effect, this, battle, value| {
            Self::pre_hook(effect, this, battle, request, value)
        })
    }

    fn pre_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &FieldRequest<C>,
        value: &Option<C>,
    ) -> Hook<Option<C>> {
        C::modify(effect, this, battle, request, *value)
    }

    fn apply(
        battle: &mut Battle,
        request: &FieldRequest<C>,
        value: Option<C>,
    ) -> Result<Transition<Option<C>>, Interrupt> {
        let previous = C::read(&battle.state().field);
        if previous == value {
            return Ok(Transition::unchanged(value));
        }
        C::write(&mut battle.state_mut().field, value);

        if let Some(old) = previous {
            battle.detach_effect(Owner::Field, &EffectId::new(old.effect_key()));
        }
        if let Some(new) = value {
            let turns = request.duration.unwrap_or(DEFAULT_FIELD_DURATION);
            battle.attach_effect(Owner::Field, &EffectId::new(new.effect_key()), Some(turns));
        }
        Ok(Transition::applied(value))
    }

    fn announce(battle: &mut Battle, _request: &FieldRequest<C>, outcome: &Transition<Option<C>>) {
        if !outcome.occurred {
            return;
        }
        let message = match outcome.magnitude {
            Some(condition) => Message::new(C::STARTED).arg(condition.effect_key()),
            None => Message::new(C::ENDED),
        };
        battle.display_message(&message);
    }

    fn post_hook(
        effect: &mut dyn Effect,
        this: &EffectInstance,
        battle: &mut Battle,
        request: &FieldRequest<C>,
        outcome: &Transition<Option<C>>,
    ) -> Hook<()> {
        C::after(effect, this, battle, request, outcome)
    }

    fn record_magnitude(outcome: &Transition<Option<C>>) -> i64 {
        i64::from(outcome.occurred)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::RecordingPresenter;
    use crate::core::BattleConfig;
    use crate::effects::{abstain, override_with, EffectRegistry, NoOpEffect};

    /// Turns any sun into rain.
    #[derive(Debug)]
    struct Overcast;

    impl Effect for Overcast {
        fn modify_weather(
            &mut self,
            _this: &EffectInstance,
            _battle: &mut Battle,
            _request: &WeatherRequest,
            weather: Option<Weather>,
        ) -> Hook<Option<Weather>> {
            if weather == Some(Weather::Sun) {
                override_with(Some(Weather::Rain))
            } else {
                abstain()
            }
        }
    }

    fn setup() -> (Battle, RecordingPresenter) {
        let recorder = RecordingPresenter::new();
        let mut registry = EffectRegistry::new();
        for key in ["sunny_day", "rain_dance", "electric_terrain"] {
            registry.register(key, |_| Box::new(NoOpEffect));
        }
        registry.register("overcast", |_| Box::new(Overcast));
        let battle =
            Battle::new(BattleConfig::new(2), Arc::new(registry)).with_presenter(recorder.clone());
        (battle, recorder)
    }

    #[test]
    fn test_weather_replaces_field_effect() {
        let (mut battle, recorder) = setup();
        WeatherHandler::apply(&mut battle, WeatherRequest::set(Weather::Sun)).unwrap();
        let sun = battle.effect(Owner::Field, &EffectId::new("sunny_day")).unwrap();
        assert_eq!(sun.remaining(), Some(DEFAULT_FIELD_DURATION));

        let rain = WeatherRequest::set(Weather::Rain).with_duration(8);
        WeatherHandler::apply(&mut battle, rain).unwrap();
        assert_eq!(battle.state().field.weather, Some(Weather::Rain));
        assert!(!battle.has_effect(Owner::Field, &EffectId::new("sunny_day")));
        let rain = battle.effect(Owner::Field, &EffectId::new("rain_dance")).unwrap();
        assert_eq!(rain.remaining(), Some(8));
        assert_eq!(recorder.message_keys(), vec!["weather_started", "weather_started"]);

        WeatherHandler::apply(&mut battle, WeatherRequest::clear()).unwrap();
        assert_eq!(battle.state().field.weather, None);
        assert!(battle.effects().snapshot(Owner::Field).is_empty());
        assert_eq!(recorder.message_keys().last().map(String::as_str), Some("weather_ended"));
    }

    #[test]
    fn test_same_weather_keeps_countdown() {
        let (mut battle, _) = setup();
        let sun = WeatherRequest::set(Weather::Sun).with_duration(3);
        WeatherHandler::apply(&mut battle, sun).unwrap();
        let again = WeatherHandler::apply(&mut battle, WeatherRequest::set(Weather::Sun)).unwrap();
        assert!(!again.occurred);
        let sun = battle.effect(Owner::Field, &EffectId::new("sunny_day")).unwrap();
        assert_eq!(sun.remaining(), Some(3));
    }

    #[test]
    fn test_override_rewrites_weather() {
        let (mut battle, _) = setup();
        battle.attach_effect(Owner::Field, &EffectId::new("overcast"), None);
        let outcome =
            WeatherHandler::apply(&mut battle, WeatherRequest::set(Weather::Sun)).unwrap();
        assert_eq!(outcome, Transition::applied(Some(Weather::Rain)));
    }

    #[test]
    fn test_terrain_is_independent() {
        let (mut battle, recorder) = setup();
        WeatherHandler::apply(&mut battle, WeatherRequest::set(Weather::Sun)).unwrap();
        TerrainHandler::apply(&mut battle, TerrainRequest::set(Terrain::Electric)).unwrap();

        assert_eq!(battle.state().field.weather, Some(Weather::Sun));
        assert_eq!(battle.state().field.terrain, Some(Terrain::Electric));
        assert!(battle.has_effect(Owner::Field, &EffectId::new("electric_terrain")));
        assert_eq!(recorder.message_keys(), vec!["weather_started", "terrain_started"]);
    }
}
