//! Recent searches: a small most-recent-first window

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecentSearch {
    pub id: String,
    pub name: String,
}

impl RecentSearch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// Prepend `new_name` and keep the newest five entries.
///
/// Empty names and names already in the list leave it untouched.
pub fn update_recent_searches(history: &[RecentSearch], new_name: &str) -> Vec<RecentSearch> {
    if new_name.is_empty() || history.iter().any(|entry| entry.name == new_name) {
        return history.to_vec();
    }

    std::iter::once(RecentSearch::new(new_name))
        .chain(history.iter().cloned())
        .take(MAX_RECENT_SEARCHES)
        .collect()
}
