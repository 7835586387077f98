//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, LocationQuery, WeatherReport};

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Weather category =====
    /// Intent: refetch the current location
    WeatherFetch,

    /// Intent: fetch a recent search by its position in the list
    WeatherFetchRecent(usize),

    /// Result: both legs loaded; `request_id` identifies the fetch
    WeatherDidLoad {
        request_id: u64,
        query: LocationQuery,
        report: Box<WeatherReport>,
    },

    /// Result: the fetch failed; `message` is user-facing
    WeatherDidError { request_id: u64, message: String },

    // ===== Locate category =====
    /// Intent: ask the geolocation provider for a position
    LocateRequest,

    /// Result: position resolved
    LocateDidResolve(Coordinates),

    /// Result: position unavailable
    LocateDidError(String),

    // ===== Favorite category =====
    /// Star or unstar the displayed place
    FavoriteToggle,

    /// Result: favorites written to disk
    FavoriteDidSave,

    /// Result: favorites could not be written
    FavoriteDidError(String),

    // ===== Search category =====
    /// Open city search overlay
    SearchOpen,

    /// Close search overlay (cancel)
    SearchClose,

    /// Search query text changed
    SearchQueryChange(String),

    /// Submit typed place name
    SearchQuerySubmit(String),

    /// Select a suggestion in the list (by index)
    SearchSelect(usize),

    /// Confirm selected suggestion
    SearchConfirm,

    // ===== UI category =====
    /// Switch metric/imperial (refetches)
    UiToggleUnits,

    /// Switch the day/night palette by hand
    UiToggleTheme,

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    /// Periodic tick for loading animation
    Tick,

    /// Exit the application
    Quit,
}
