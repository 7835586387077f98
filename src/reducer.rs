//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::history::update_recent_searches;
use crate::model::LocationQuery;
use crate::state::{AppState, LOADING_ANIM_CYCLE_TICKS};
use crate::theme::derive_night_flag;

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Weather actions =====
        Action::WeatherFetch => {
            let query = state.location.clone();
            begin_fetch(state, query, true)
        }

        Action::WeatherFetchRecent(index) => {
            let Some(entry) = state.recent.get(index) else {
                return DispatchResult::unchanged();
            };
            let query = LocationQuery::Name(entry.name.clone());
            begin_fetch(state, query, false)
        }

        Action::WeatherDidLoad {
            request_id,
            query,
            report,
        } => {
            if request_id != state.request_id {
                return DispatchResult::unchanged();
            }
            state.dark_mode = derive_night_flag(report.current.observed_at, report.current.utc_offset);
            if let Some(name) = query.place_name() {
                state.recent = update_recent_searches(&state.recent, name);
            }
            state.weather = DataResource::Loaded(*report);
            state.is_refreshing = false;
            state.loading_anim_ticks_remaining = ticks_to_phase_zero(state.tick_count);
            DispatchResult::changed()
        }

        Action::WeatherDidError {
            request_id,
            message,
        } => {
            if request_id != state.request_id {
                return DispatchResult::unchanged();
            }
            state.weather = DataResource::Failed(message);
            state.is_refreshing = false;
            state.loading_anim_ticks_remaining = ticks_to_phase_zero(state.tick_count);
            DispatchResult::changed()
        }

        // ===== Locate actions =====
        Action::LocateRequest => {
            if state.locating {
                return DispatchResult::unchanged();
            }
            state.locating = true;
            state.notice = None;
            DispatchResult::changed_with(Effect::Locate)
        }

        Action::LocateDidResolve(coords) => {
            state.locating = false;
            begin_fetch(state, LocationQuery::Coordinates(coords), false)
        }

        Action::LocateDidError(msg) => {
            state.locating = false;
            state.notice = Some(msg);
            DispatchResult::changed()
        }

        // ===== Favorite actions =====
        Action::FavoriteToggle => {
            let Some(name) = state.report().map(|r| r.current.name.clone()) else {
                return DispatchResult::unchanged();
            };
            state.favorites.toggle(&name);
            DispatchResult::changed_with(Effect::SaveFavorites {
                favorites: state.favorites.clone(),
            })
        }

        Action::FavoriteDidSave => DispatchResult::unchanged(),

        Action::FavoriteDidError(msg) => {
            state.notice = Some(msg);
            DispatchResult::changed()
        }

        // ===== Search actions =====
        Action::SearchOpen => {
            state.search_mode = true;
            state.search_query.clear();
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchClose => {
            close_search(state);
            DispatchResult::changed()
        }

        Action::SearchQueryChange(query) => {
            state.search_query = query;
            state.search_selected = 0;
            DispatchResult::changed()
        }

        Action::SearchQuerySubmit(query) => {
            let Some(query) = LocationQuery::name(&query) else {
                return DispatchResult::unchanged();
            };
            close_search(state);
            begin_fetch(state, query, false)
        }

        Action::SearchSelect(index) => {
            if index < state.search_suggestions().len() && index != state.search_selected {
                state.search_selected = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::SearchConfirm => {
            let Some(name) = state
                .search_suggestions()
                .get(state.search_selected)
                .map(|entry| entry.name.clone())
            else {
                return DispatchResult::unchanged();
            };
            close_search(state);
            begin_fetch(state, LocationQuery::Name(name), false)
        }

        // ===== UI actions =====
        Action::UiToggleUnits => {
            state.units = state.units.toggle();
            let query = state.location.clone();
            begin_fetch(state, query, true)
        }

        Action::UiToggleTheme => {
            state.dark_mode = !state.dark_mode;
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Tick => {
            let animating = state.loading_anim_active();
            if animating {
                state.tick_count = state.tick_count.wrapping_add(1);
                if state.loading_anim_ticks_remaining > 0 {
                    state.loading_anim_ticks_remaining -= 1;
                }
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Issue a new fetch under a fresh request id. A refresh keeps the loaded
/// report on screen; anything else shows the loading state.
fn begin_fetch(state: &mut AppState, query: LocationQuery, refresh: bool) -> DispatchResult<Effect> {
    state.request_id = state.request_id.wrapping_add(1);
    if refresh && state.weather.is_loaded() {
        state.is_refreshing = true;
    } else {
        state.weather = DataResource::Loading;
        state.is_refreshing = false;
    }
    state.location = query.clone();
    state.notice = None;
    state.tick_count = 0;
    state.loading_anim_ticks_remaining = 0;
    DispatchResult::changed_with(Effect::FetchWeather {
        request_id: state.request_id,
        query,
        units: state.units,
    })
}

fn close_search(state: &mut AppState) {
    state.search_mode = false;
    state.search_query.clear();
    state.search_selected = 0;
}

fn ticks_to_phase_zero(tick_count: u32) -> u32 {
    let cycle = LOADING_ANIM_CYCLE_TICKS.max(1);
    if tick_count == 0 {
        return cycle;
    }
    let remainder = tick_count % cycle;
    if remainder == 0 { 0 } else { cycle - remainder }
}
