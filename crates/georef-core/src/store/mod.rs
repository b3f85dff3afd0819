// ── Shared reference store ──
//
// Write-once listing cache plus the in-flight fetch deduplicator that
// sits in front of it. One pair per hierarchy type, shared by every
// section.

mod cache;
mod dedup;

pub use cache::CacheStore;
pub use dedup::{DedupStats, Deduplicator, Lookup, PendingFetch, Settlement};
