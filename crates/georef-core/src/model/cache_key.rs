// ── Cache keys ──
//
// A CacheKey names the parent whose children listing is cached. The
// variants are closed: there is no key for "children of a city", so
// such a lookup cannot be expressed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::level::Level;

/// Identifies one cacheable children listing: `(level, parentKey)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "parent", rename_all = "lowercase")]
pub enum CacheKey {
    /// The top level: children are countries.
    Root,
    /// Children are the states of `country`.
    Country { country: String },
    /// Children are the cities of `state` within `country`. Subdivision
    /// codes are only unique inside a country, so both are part of the key.
    State { country: String, state: String },
}

impl CacheKey {
    pub fn country(country: impl Into<String>) -> Self {
        Self::Country {
            country: country.into(),
        }
    }

    pub fn state(country: impl Into<String>, state: impl Into<String>) -> Self {
        Self::State {
            country: country.into(),
            state: state.into(),
        }
    }

    /// The level of the nodes this key's listing contains.
    pub const fn child_level(&self) -> Level {
        match self {
            Self::Root => Level::Country,
            Self::Country { .. } => Level::State,
            Self::State { .. } => Level::City,
        }
    }

    /// Build the key for the options at `level` from the selections above it.
    ///
    /// Returns `None` when an ancestor selection is missing.
    pub fn for_level(level: Level, country: Option<&str>, state: Option<&str>) -> Option<Self> {
        match level {
            Level::Country => Some(Self::Root),
            Level::State => country.map(Self::country),
            Level::City => Some(Self::state(country?, state?)),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("countries"),
            Self::Country { country } => write!(f, "states:{country}"),
            Self::State { country, state } => write!(f, "cities:{country}/{state}"),
        }
    }
}
