// ── Hierarchy levels ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One level of the country → state → city hierarchy.
///
/// Ordered root first, so `Level::Country < Level::City`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Country,
    State,
    City,
}

impl Level {
    /// Every level, root first.
    pub const ALL: [Level; 3] = [Level::Country, Level::State, Level::City];

    /// Position in [`Level::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Country => 0,
            Self::State => 1,
            Self::City => 2,
        }
    }

    /// The level whose options depend on a selection at this level.
    pub const fn child(self) -> Option<Level> {
        match self {
            Self::Country => Some(Self::State),
            Self::State => Some(Self::City),
            Self::City => None,
        }
    }

    pub const fn parent(self) -> Option<Level> {
        match self {
            Self::Country => None,
            Self::State => Some(Self::Country),
            Self::City => Some(Self::State),
        }
    }

    /// All levels strictly below this one, nearest first.
    pub fn descendants(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().filter(move |l| *l > self)
    }
}
