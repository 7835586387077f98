//! Effects - side effects declared by the reducer

use crate::favorites::FavoriteSet;
use crate::model::{LocationQuery, UnitSystem};

/// Side effects that can be triggered by actions
#[derive(Debug, Clone)]
pub enum Effect {
    /// Fetch current conditions and forecast; `request_id` tags the result
    FetchWeather {
        request_id: u64,
        query: LocationQuery,
        units: UnitSystem,
    },
    /// Ask the geolocation provider for a position
    Locate,
    /// Persist the favorites
    SaveFavorites { favorites: FavoriteSet },
}
