use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::{classify_section, CommittedSchedule, CorequisiteSource, PlanError, Term};
use crate::server::util::{load_snapshot, plan_error_to_response, resolve_term};
use crate::types::AppState;

/// GET /terms
/// Returns every term code present in the catalog
pub async fn get_terms(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /terms");

    let terms: Vec<_> = s
        .catalog
        .term_codes()
        .into_iter()
        .map(|code| {
            json!({
                "code": code,
                "name": Term::from_code(code).map(|term| term.to_string()),
            })
        })
        .collect();

    (StatusCode::OK, Json(terms)).into_response()
}

/// Query parameters for section search.
#[derive(Debug, Deserialize)]
pub struct SectionQueryParams {
    /// Case-insensitive match against course codes and titles
    #[serde(default)]
    pub q: String,
}

/// GET /terms/:term/sections?q=
/// Searches the catalog; every hit is annotated with the conflicts it would
/// cause against the term's current committed plan
pub async fn get_sections(
    Path(term_code): Path<String>,
    Query(params): Query<SectionQueryParams>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /terms/{}/sections?q={}", term_code, params.q);

    match sections_internal(&s, &term_code, &params.q) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            if !e.is_user_error() {
                error!("Failed to search sections: {}", e);
            }
            plan_error_to_response(e)
        }
    }
}

fn sections_internal(
    state: &Arc<AppState>,
    term_code: &str,
    query: &str,
) -> Result<Vec<serde_json::Value>, PlanError> {
    let term = resolve_term(term_code)?;

    // No term row yet means nothing is committed.
    let snapshot = match state.db.find_term(term.season, term.year)? {
        Some(term_id) => load_snapshot(state, term, term_id)?,
        None => CommittedSchedule::default(),
    };

    let response = state
        .catalog
        .search(&term.code(), query)
        .into_iter()
        .map(|section| {
            let corequisites = state.catalog.corequisites_for(&section.course_id);
            let conflicts = classify_section(section, &snapshot, &corequisites);
            json!({
                "section": section,
                "conflicts": conflicts,
            })
        })
        .collect();

    Ok(response)
}
