//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::favorites::FavoriteSet;
use crate::history::RecentSearch;
use crate::model::{LocationQuery, UnitSystem, WeatherReport};
use crate::theme::{select_background_key, BackgroundKey};

/// Place shown before anything else is asked for.
pub const DEFAULT_CITY: &str = "New Delhi";

/// Animation timing for the header gradient seam.
pub const LOADING_ANIM_TICK_MS: u64 = 15;
pub const LOADING_ANIM_CYCLE_TICKS: u32 = 60;

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Core data (visible in debug) ---
    /// Location of the report on screen (or of the first fetch)
    #[debug(section = "Location", label = "Query", debug_fmt)]
    pub location: LocationQuery,

    /// Report lifecycle: Empty → Loading → Loaded/Failed
    #[debug(section = "Weather", label = "Report", debug_fmt)]
    pub weather: DataResource<WeatherReport>,

    /// Whether a refresh is in progress (keeps showing current data during fetch)
    #[debug(section = "Weather", label = "Refreshing")]
    pub is_refreshing: bool,

    /// Id of the most recent fetch; results carrying another id are stale
    #[debug(section = "Weather", label = "Request")]
    pub request_id: u64,

    #[debug(section = "Weather", label = "Units", debug_fmt)]
    pub units: UnitSystem,

    /// Night palette; set from local time on each load, toggled by hand
    #[debug(section = "Theme", label = "Dark")]
    pub dark_mode: bool,

    #[debug(section = "Places", label = "Recent", debug_fmt)]
    pub recent: Vec<RecentSearch>,

    #[debug(section = "Places", label = "Favorites", debug_fmt)]
    pub favorites: FavoriteSet,

    /// Waiting on the geolocation provider
    #[debug(section = "Places", label = "Locating")]
    pub locating: bool,

    /// Non-fetch problems (geolocation, saving favorites)
    #[debug(section = "Places", label = "Notice", debug_fmt)]
    pub notice: Option<String>,

    // --- Animation internals (skipped) ---
    #[debug(skip)]
    pub tick_count: u32,

    /// Remaining ticks to finish the current animation cycle after loading
    #[debug(skip)]
    pub loading_anim_ticks_remaining: u32,

    // --- Search mode (skipped) ---
    #[debug(skip)]
    pub search_mode: bool,

    #[debug(skip)]
    pub search_query: String,

    /// Selected index among recent searches matching the query
    #[debug(skip)]
    pub search_selected: usize,
}

impl AppState {
    pub fn new(location: LocationQuery, units: UnitSystem) -> Self {
        Self {
            location,
            weather: DataResource::Empty,
            is_refreshing: false,
            request_id: 0,
            units,
            dark_mode: false,
            recent: Vec::new(),
            favorites: FavoriteSet::default(),
            locating: false,
            notice: None,
            tick_count: 0,
            loading_anim_ticks_remaining: 0,
            search_mode: false,
            search_query: String::new(),
            search_selected: 0,
        }
    }

    pub fn with_favorites(mut self, favorites: FavoriteSet) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.weather.data()
    }

    /// Palette selector for whatever is on screen right now.
    pub fn background(&self) -> BackgroundKey {
        let current = self.report().map(|r| &r.current);
        select_background_key(
            current.map(|c| c.condition.as_str()),
            current.map(|c| c.temperature),
            self.dark_mode,
        )
    }

    /// Whether the displayed place is a favorite.
    pub fn is_favorite(&self) -> bool {
        self.report()
            .is_some_and(|r| self.favorites.contains(&r.current.name))
    }

    /// Recent searches whose name contains the search query (case-insensitive).
    pub fn search_suggestions(&self) -> Vec<&RecentSearch> {
        let needle = self.search_query.trim().to_lowercase();
        self.recent
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn loading_anim_active(&self) -> bool {
        self.weather.is_loading()
            || self.is_refreshing
            || self.locating
            || self.loading_anim_ticks_remaining > 0
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            LocationQuery::Name(DEFAULT_CITY.into()),
            UnitSystem::default(),
        )
    }
}
