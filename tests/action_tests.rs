//! Action and state tests using TestHarness
//!
//! Dispatch through a store, then check state and declared effects.

use tui_dispatch::testing::*;
use tui_dispatch::{EffectStore, NumericComponentId, assert_emitted, assert_not_emitted};
use weatherdeck::{
    action::Action,
    components::{Component, WeatherDisplay, WeatherDisplayProps},
    effect::Effect,
    history::MAX_RECENT_SEARCHES,
    model::{
        Coordinates, CurrentConditions, ForecastSeries, LocationQuery, UnitSystem, WeatherReport,
    },
    reducer::reducer,
    state::AppState,
};

/// 2024-01-01 12:00 UTC
const NOON: i64 = 1_704_110_400;

fn report(name: &str, condition: &str, temperature: f64) -> WeatherReport {
    WeatherReport {
        current: CurrentConditions {
            name: name.into(),
            country: "GB".into(),
            temperature,
            feels_like: temperature - 1.0,
            humidity: 70,
            pressure: 1015.0,
            wind_speed: 3.5,
            cloud_cover: 20,
            visibility: 10000,
            condition: condition.into(),
            description: condition.to_lowercase(),
            sunrise: NOON - 6 * 3600,
            sunset: NOON + 4 * 3600,
            observed_at: NOON,
            utc_offset: 0,
        },
        forecast: ForecastSeries::default(),
    }
}

fn did_load(store: &EffectStore<AppState, Action, Effect>, name: &str) -> Action {
    Action::WeatherDidLoad {
        request_id: store.state().request_id,
        query: LocationQuery::Name(name.into()),
        report: Box::new(report(name, "Clear", 18.0)),
    }
}

#[test]
fn test_reducer_weather_fetch() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    assert!(store.state().weather.is_empty());

    let result = store.dispatch(Action::WeatherFetch);
    assert!(result.changed, "State should change");
    assert!(store.state().weather.is_loading());
    assert_eq!(result.effects.len(), 1);
    assert!(matches!(
        &result.effects[0],
        Effect::FetchWeather { request_id: 1, query: LocationQuery::Name(name), units: UnitSystem::Metric }
            if name == "New Delhi"
    ));
}

#[test]
fn test_reducer_weather_load_records_recent_search() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    store.dispatch(Action::SearchQuerySubmit("London".into()));
    let action = did_load(&store, "London");
    store.dispatch(action);

    let state = store.state();
    assert!(state.weather.is_loaded());
    assert_eq!(state.report().map(|r| r.current.name.as_str()), Some("London"));
    assert_eq!(state.recent.len(), 1);
    assert_eq!(state.recent[0].name, "London");
}

#[test]
fn test_only_latest_request_is_applied() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    store.dispatch(Action::SearchQuerySubmit("Paris".into()));
    let stale = did_load(&store, "Paris");
    store.dispatch(Action::SearchQuerySubmit("Tokyo".into()));
    let fresh = did_load(&store, "Tokyo");

    // Tokyo answers first, Paris straggles in afterwards
    assert!(store.dispatch(fresh).changed);
    assert!(!store.dispatch(stale).changed);

    let state = store.state();
    assert_eq!(state.report().map(|r| r.current.name.as_str()), Some("Tokyo"));
    assert_eq!(state.recent.len(), 1);
    assert_eq!(state.recent[0].name, "Tokyo");
}

#[test]
fn test_recent_searches_capped_and_repeats_ignored() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    for name in ["A", "B", "C", "D", "E", "F", "C"] {
        store.dispatch(Action::SearchQuerySubmit(name.into()));
        let action = did_load(&store, name);
        store.dispatch(action);
    }

    let names: Vec<_> = store
        .state()
        .recent
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names.len(), MAX_RECENT_SEARCHES);
    // A fell off the end; the repeated C keeps its place
    assert_eq!(names, vec!["F", "E", "D", "C", "B"]);
}

#[test]
fn test_coordinate_fetch_does_not_touch_recent_searches() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    let coords = Coordinates::new(51.5, -0.12).unwrap();

    store.dispatch(Action::LocateRequest);
    let result = store.dispatch(Action::LocateDidResolve(coords));
    assert!(matches!(
        &result.effects[0],
        Effect::FetchWeather { query: LocationQuery::Coordinates(c), .. } if *c == coords
    ));

    let request_id = store.state().request_id;
    store.dispatch(Action::WeatherDidLoad {
        request_id,
        query: LocationQuery::Coordinates(coords),
        report: Box::new(report("London", "Clouds", 9.0)),
    });

    assert!(store.state().weather.is_loaded());
    assert!(store.state().recent.is_empty());
}

#[test]
fn test_reducer_toggle_units_refetches() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    assert_eq!(store.state().units, UnitSystem::Metric);
    let result = store.dispatch(Action::UiToggleUnits);
    assert_eq!(store.state().units, UnitSystem::Imperial);
    assert!(matches!(
        &result.effects[0],
        Effect::FetchWeather {
            units: UnitSystem::Imperial,
            ..
        }
    ));
    store.dispatch(Action::UiToggleUnits);
    assert_eq!(store.state().units, UnitSystem::Metric);
}

#[test]
fn test_blank_search_is_ignored() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    store.dispatch(Action::SearchOpen);
    let result = store.dispatch(Action::SearchQuerySubmit("   ".into()));

    assert!(!result.changed);
    assert!(result.effects.is_empty());
    assert!(store.state().search_mode);
}

#[test]
fn test_component_keyboard_events() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut component = WeatherDisplay;

    let actions = harness.send_keys::<NumericComponentId, _, _>("r", |state, event| {
        let props = WeatherDisplayProps {
            state,
            is_focused: true,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_count(1);
    actions.assert_first(Action::WeatherFetch);
}

#[test]
fn test_component_ignores_when_unfocused() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut component = WeatherDisplay;

    let actions = harness.send_keys::<NumericComponentId, _, _>("r q u l f", |state, event| {
        let props = WeatherDisplayProps {
            state,
            is_focused: false,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_empty();
}

#[test]
fn test_action_categories() {
    let did_error = Action::WeatherDidError {
        request_id: 1,
        message: "oops".into(),
    };
    let toggle = Action::UiToggleUnits;
    let tick = Action::Tick;

    assert_eq!(did_error.category(), Some("weather_did"));
    assert_eq!(toggle.category(), Some("ui"));
    assert_eq!(tick.category(), None);

    assert!(did_error.is_weather_did());
    assert!(toggle.is_ui());
}

#[test]
fn test_harness_emit_and_drain() {
    let mut harness = TestHarness::<(), Action>::new(());

    harness.emit(Action::WeatherFetch);
    harness.emit(Action::LocateRequest);
    harness.emit(Action::LocateDidError("denied".into()));

    let actions = harness.drain_emitted();
    actions.assert_count(3);
}

#[test]
fn test_assert_emitted_macro() {
    let actions = vec![
        Action::WeatherFetch,
        Action::WeatherDidLoad {
            request_id: 1,
            query: LocationQuery::Name("Oslo".into()),
            report: Box::new(report("Oslo", "Snow", -4.0)),
        },
    ];

    assert_emitted!(actions, Action::WeatherFetch);
    assert_emitted!(actions, Action::WeatherDidLoad { .. });
    assert_not_emitted!(actions, Action::Quit);
    assert_not_emitted!(actions, Action::WeatherDidError { .. });
}

#[test]
fn test_custom_start_location() {
    let coords = Coordinates::new(12.34, 56.78).unwrap();
    let state = AppState::new(LocationQuery::Coordinates(coords), UnitSystem::Imperial);

    assert_eq!(state.location, LocationQuery::Coordinates(coords));
    assert_eq!(state.units, UnitSystem::Imperial);
    assert!(state.weather.is_empty());
}

#[test]
fn test_unit_formatting() {
    assert_eq!(UnitSystem::Metric.format_temperature(21.6), "22°C");
    assert_eq!(UnitSystem::Imperial.format_temperature(71.2), "71°F");
    assert_eq!(UnitSystem::Metric.format_temperature(-0.3), "0°C");
}
