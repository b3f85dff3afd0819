// ── Cascading selections ──
//
// Per-section selection state and the controller that keeps dependent
// levels consistent while lookups are in flight.

mod section;
mod state;

pub use section::AddressSection;
pub use state::{ApplyOutcome, LevelPhase, LevelState, SectionState};
