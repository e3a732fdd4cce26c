//! The schedule core: conflict detection and recurring-calendar projection.
//!
//! Everything in this module is pure and synchronous over snapshots handed
//! in by the caller; the store and catalog layers own the data, the server
//! layer re-invokes these functions whenever committed state changes.

mod conflicts;
mod error;
mod recurrence;
mod term;
pub mod time;
mod types;

pub use conflicts::{
    classify_section, compute_conflicts, CommittedSchedule, ConflictReport, CorequisiteSource,
};
pub use error::PlanError;
pub use recurrence::{
    materialize_calendar, project_occurrences, CalendarEvent, RecurrencePlacement,
};
pub use term::{Season, Term};
pub use types::{
    ConflictParty, ConflictRecord, ConflictType, CourseRef, Instructor, PlanEvent, PlanEventKind,
    Section,
};
