// ── ReferenceNode ──

use serde::{Deserialize, Serialize};

use super::level::Level;

/// One entry at a hierarchy level.
///
/// `key` is the stable external identifier (ISO country or subdivision
/// code, service city id) and is unique among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub key: String,
    pub display_name: String,
    pub level: Level,
}

impl ReferenceNode {
    pub fn new(level: Level, key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            level,
        }
    }

    /// Convert a wire row into a node at `level`.
    pub fn from_raw(level: Level, raw: georef_api::RawNode) -> Self {
        Self {
            key: raw.code,
            display_name: raw.name,
            level,
        }
    }
}
