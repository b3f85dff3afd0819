// Wire types for the reference-data service.

use serde::{Deserialize, Serialize};

/// One row of a countries / states / cities listing as returned by the service.
///
/// Different deployments label the identifier differently, so `iso2`, `key`
/// and `id` are accepted as aliases for `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(alias = "iso2", alias = "key", alias = "id")]
    pub code: String,
    pub name: String,
}
