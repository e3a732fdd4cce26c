//! Error types for plan mutations.
//!
//! Expected user-facing failures (duplicate add, unschedulable section,
//! unknown term) travel as values so callers can surface warnings instead
//! of crashing; storage failures are wrapped from the store layer.

use thiserror::Error;

/// Errors that can occur while mutating or reading a term plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The CRN is already committed for this term
    #[error("section {crn} is already planned for this term")]
    DuplicateSection { crn: String },

    /// The section has no meeting pattern and cannot be placed on a calendar
    #[error("section {crn} has no scheduled meeting times")]
    Unschedulable { crn: String },

    /// The term code did not decode to a known season/year
    #[error("unknown term code: {code}")]
    UnknownTerm { code: String },

    /// The CRN does not exist in the catalog for this term
    #[error("section {crn} not found in term {term}")]
    SectionNotFound { term: String, crn: String },

    /// The plan event id does not exist for this term
    #[error("plan event {id} not found")]
    EventNotFound { id: i64 },

    /// Underlying storage failure
    #[error("storage error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl PlanError {
    /// Returns true for expected, user-recoverable conditions (as opposed
    /// to storage failures).
    pub fn is_user_error(&self) -> bool {
        !matches!(self, PlanError::Db(_))
    }
}
