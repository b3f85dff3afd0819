// ── Reference-data domain model ──
//
// The hierarchy levels, the nodes that populate them, and the keys
// that address one cacheable children listing.

pub mod cache_key;
pub mod level;
pub mod node;

// ── Re-exports ──────────────────────────────────────────────────────

pub use cache_key::CacheKey;
pub use level::Level;
pub use node::ReferenceNode;
