// ── Cascade controller ──
//
// One AddressSection per logical address block ("current", "permanent").
// Each owns its selections and generation tokens; all sections of a
// resolver share its cache and deduplicator.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use super::state::{ApplyOutcome, LevelPhase, SectionState};
use crate::model::{CacheKey, Level, ReferenceNode};
use crate::source::{ReferenceSource, fetcher_for};
use crate::store::{Deduplicator, Lookup, Settlement};
use crate::stream::SectionStream;

/// Cascading country → state → city selection state for one form section.
///
/// Cheaply cloneable; clones drive the same section. Every state change
/// goes through a single `watch` channel, and late results are applied
/// only when their generation token is still current.
#[derive(Clone)]
pub struct AddressSection {
    inner: Arc<SectionInner>,
}

struct SectionInner {
    name: String,
    dedup: Deduplicator,
    source: Arc<dyn ReferenceSource>,
    state: watch::Sender<SectionState>,
}

impl AddressSection {
    pub(crate) fn new(
        name: String,
        dedup: Deduplicator,
        source: Arc<dyn ReferenceSource>,
    ) -> Self {
        let (state, _) = watch::channel(SectionState::default());
        Self {
            inner: Arc::new(SectionInner {
                name,
                dedup,
                source,
                state,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Select `key` at `level` (an empty key clears the selection).
    ///
    /// Clears every level below, bumps their generation tokens, and starts
    /// loading the options of the next level when its ancestors are known.
    /// Re-selecting the current value is a no-op. A cached listing is
    /// applied before this returns; otherwise a task applies it on arrival.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_ancestor(&self, level: Level, key: &str) {
        let key = key.trim();
        let selection = (!key.is_empty()).then(|| key.to_owned());
        let mut request = None;

        let changed = self.inner.state.send_if_modified(|state| {
            if state.level(level).selection == selection {
                return false;
            }
            state.level_mut(level).selection.clone_from(&selection);
            for below in level.descendants() {
                state.level_mut(below).invalidate();
            }

            if let Some(child) = level.child() {
                let lookup = CacheKey::for_level(
                    child,
                    state.selection(Level::Country),
                    state.selection(Level::State),
                );
                if let Some(lookup) = lookup {
                    let slot = state.level_mut(child);
                    slot.phase = LevelPhase::Loading;
                    request = Some((child, slot.generation, lookup));
                }
            }
            true
        });

        if !changed {
            trace!(section = %self.inner.name, %level, key, "selection unchanged");
            return;
        }
        debug!(section = %self.inner.name, %level, key, "selection changed");

        if let Some((child, generation, lookup)) = request {
            self.dispatch(child, generation, &lookup);
        }
    }

    /// Start loading the country options if they are not loaded or loading.
    ///
    /// A failed earlier attempt is retried.
    pub fn load_countries(&self) {
        let mut request = None;
        self.inner.state.send_if_modified(|state| {
            let slot = state.level_mut(Level::Country);
            if matches!(slot.phase, LevelPhase::Loading | LevelPhase::Settled) {
                return false;
            }
            slot.generation += 1;
            slot.phase = LevelPhase::Loading;
            request = Some(slot.generation);
            true
        });

        if let Some(generation) = request {
            self.dispatch(Level::Country, generation, &CacheKey::Root);
        }
    }

    /// Replay another section's selections into this one, root first.
    ///
    /// Levels that already match are left alone, and listings the other
    /// section loaded come straight from the shared cache.
    pub fn copy_from(&self, other: &AddressSection) {
        let source = other.snapshot();
        for level in Level::ALL {
            self.set_ancestor(level, source.selection(level).unwrap_or_default());
        }
    }

    /// Drop every selection (country options stay loaded).
    pub fn clear(&self) {
        self.inner.state.send_modify(|state| {
            state.level_mut(Level::Country).selection = None;
            for below in Level::Country.descendants() {
                state.level_mut(below).invalidate();
            }
        });
        debug!(section = %self.inner.name, "selections cleared");
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Options for `level` under the current ancestor chain, or empty.
    pub fn children(&self, level: Level) -> Arc<[ReferenceNode]> {
        self.inner.state.borrow().children(level)
    }

    /// `true` while a fetch for `level` is outstanding and still current.
    pub fn is_loading(&self, level: Level) -> bool {
        self.inner.state.borrow().is_loading(level)
    }

    pub fn selection(&self, level: Level) -> Option<String> {
        self.inner.state.borrow().selection(level).map(str::to_owned)
    }

    pub fn phase(&self, level: Level) -> LevelPhase {
        self.inner.state.borrow().level(level).phase
    }

    pub fn snapshot(&self) -> SectionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> SectionStream {
        SectionStream::new(self.inner.state.subscribe())
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Resolve the options for `level` and apply them under `generation`.
    fn dispatch(&self, level: Level, generation: u64, key: &CacheKey) {
        let fetcher = fetcher_for(&self.inner.source, key);
        match self.inner.dedup.lookup(key, fetcher) {
            Lookup::Ready(settlement) => {
                self.apply(level, generation, &settlement);
            }
            Lookup::Pending(fetch) => {
                let section = self.clone();
                tokio::spawn(async move {
                    let settlement = fetch.await;
                    section.apply(level, generation, &settlement);
                });
            }
        }
    }

    /// Apply a settled lookup iff `generation` is still current for `level`.
    fn apply(&self, level: Level, generation: u64, settlement: &Settlement) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::Stale;
        self.inner.state.send_if_modified(|state| {
            let slot = state.level_mut(level);
            if slot.generation != generation {
                return false;
            }
            slot.children = settlement.nodes();
            slot.phase = if settlement.is_failed() {
                LevelPhase::Failed
            } else {
                LevelPhase::Settled
            };
            outcome = ApplyOutcome::Applied;
            true
        });

        match outcome {
            ApplyOutcome::Applied => {
                debug!(section = %self.inner.name, %level, generation, "options applied");
            }
            ApplyOutcome::Stale => {
                trace!(section = %self.inner.name, %level, generation, "discarding stale result");
            }
        }
        outcome
    }
}

impl fmt::Debug for AddressSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressSection")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}
