//! Shared helpers for the endpoint handlers: term resolution, snapshot
//! loading, report caching, and error-to-response mapping.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::DbPlanEvent;
use crate::schedule::{compute_conflicts, CommittedSchedule, ConflictReport, PlanError, Term};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Decodes a term-code path segment.
pub fn resolve_term(code: &str) -> Result<Term, PlanError> {
    Term::from_code(code).ok_or_else(|| PlanError::UnknownTerm {
        code: code.to_owned(),
    })
}

/// Loads the committed snapshot for a term: every plan event from the store
/// plus catalog sections for every committed CRN. The store returns a
/// consistent view because course groups mutate transactionally.
pub fn load_snapshot(
    state: &Arc<AppState>,
    term: Term,
    term_id: i64,
) -> Result<CommittedSchedule, PlanError> {
    let term_code = term.code();
    let events: Vec<_> = state
        .db
        .list_events_for_term(term_id)?
        .into_iter()
        .filter_map(DbPlanEvent::into_plan_event)
        .collect();
    let sections: Vec<_> = events
        .iter()
        .filter_map(|event| event.crn())
        .filter_map(|crn| state.catalog.find_section(&term_code, crn))
        .cloned()
        .collect();
    Ok(CommittedSchedule::new(events, sections))
}

/// Gets the conflict report for a term, recomputing and caching it if no
/// fresh copy exists.
pub fn conflict_report(
    state: &Arc<AppState>,
    term: Term,
    term_id: i64,
) -> Result<Arc<ConflictReport>, PlanError> {
    if let Some(report) = state.conflict_cache.get(term_id) {
        return Ok(report);
    }
    let snapshot = load_snapshot(state, term, term_id)?;
    let report = Arc::new(compute_conflicts(&snapshot, &state.catalog));
    state.conflict_cache.insert(term_id, Arc::clone(&report));
    Ok(report)
}

/// Converts PlanError to an API response.
pub fn plan_error_to_response(error: PlanError) -> Response {
    let (status, message) = match &error {
        PlanError::DuplicateSection { .. } => (
            StatusCode::CONFLICT,
            "Section is already planned for this term",
        ),
        PlanError::Unschedulable { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Section has no scheduled meeting times and cannot be added",
        ),
        PlanError::UnknownTerm { .. } => (StatusCode::NOT_FOUND, "Unknown term code"),
        PlanError::SectionNotFound { .. } => (StatusCode::NOT_FOUND, "Section not found"),
        PlanError::EventNotFound { .. } => (StatusCode::NOT_FOUND, "Plan event not found"),
        PlanError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure"),
    };

    ApiErrorType::from((status, message, Some(error.to_string()))).into_response()
}
