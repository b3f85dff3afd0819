// ── Section state ──
//
// The UI-visible state of one address section: per level, the selected
// key, the options currently offered, the load phase and the generation
// token that guards late results.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{Level, ReferenceNode};

/// Load phase of one level's options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelPhase {
    /// Nothing requested (no ancestor selected yet, or cleared).
    #[default]
    Idle,
    /// A fetch for the current generation is outstanding.
    Loading,
    /// Options applied from a successful lookup.
    Settled,
    /// The lookup failed; options are empty.
    Failed,
}

/// Whether a settled lookup made it into the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The generation moved on while the fetch was in flight.
    Stale,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelState {
    /// Key selected at this level, if any.
    pub selection: Option<String>,
    /// Options for this level under the current ancestor chain.
    pub children: Arc<[ReferenceNode]>,
    pub phase: LevelPhase,
    /// Bumped whenever an ancestor selection changes.
    pub generation: u64,
}

impl LevelState {
    pub fn is_loading(&self) -> bool {
        self.phase == LevelPhase::Loading
    }

    /// Reset selection and options, invalidating anything in flight.
    pub(crate) fn invalidate(&mut self) {
        self.selection = None;
        self.children = Arc::default();
        self.phase = LevelPhase::Idle;
        self.generation += 1;
    }
}

/// Snapshot of a whole section, root level first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionState {
    levels: [LevelState; 3],
}

impl SectionState {
    pub fn level(&self, level: Level) -> &LevelState {
        &self.levels[level.index()]
    }

    pub(crate) fn level_mut(&mut self, level: Level) -> &mut LevelState {
        &mut self.levels[level.index()]
    }

    pub fn selection(&self, level: Level) -> Option<&str> {
        self.level(level).selection.as_deref()
    }

    pub fn children(&self, level: Level) -> Arc<[ReferenceNode]> {
        Arc::clone(&self.level(level).children)
    }

    pub fn is_loading(&self, level: Level) -> bool {
        self.level(level).is_loading()
    }

    /// `true` once no level has a fetch outstanding.
    pub fn is_quiescent(&self) -> bool {
        self.levels.iter().all(|l| !l.is_loading())
    }

    /// The selected node at `level`, when it is among the loaded options.
    pub fn selected_node(&self, level: Level) -> Option<&ReferenceNode> {
        let key = self.selection(level)?;
        self.level(level).children.iter().find(|n| n.key == key)
    }
}
