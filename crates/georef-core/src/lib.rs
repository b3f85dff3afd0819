//! Hierarchical reference-data resolver between `georef-api` and UI consumers.
//!
//! This crate owns the caching, request deduplication and cascading
//! selection logic for country → state → city pickers:
//!
//! - **[`Resolver`]**: One per hierarchy type, built at start-up and shared
//!   by every widget. [`connect()`](Resolver::connect) wires it to the HTTP
//!   service; [`section()`](Resolver::section) vends independent address
//!   sections on top of the shared cache.
//!
//! - **[`CacheStore`]** / **[`Deduplicator`]**: Write-once listing cache
//!   keyed by [`CacheKey`], fronted by an in-flight map so concurrent
//!   lookups for the same parent share one fetch. Failures degrade to an
//!   empty listing and are never cached.
//!
//! - **[`AddressSection`]**: Per-section selections with generation
//!   tokens. Changing a level clears every level below it and discards
//!   results that arrive for a superseded selection.
//!
//! - **[`SectionStream`]**: Subscription handle exposing
//!   `current()` / `latest()` / `changed()` for reactive rendering.

pub mod cascade;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod source;
pub mod store;
pub mod stream;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cascade::{AddressSection, ApplyOutcome, LevelPhase, LevelState, SectionState};
pub use config::{ResolverConfig, TlsVerification};
pub use error::CoreError;
pub use model::{CacheKey, Level, ReferenceNode};
pub use resolver::Resolver;
pub use source::{ReferenceSource, fetch_children};
pub use store::{CacheStore, DedupStats, Deduplicator, Settlement};
pub use stream::{SectionStream, SectionWatchStream};
