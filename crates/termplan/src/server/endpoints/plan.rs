//! Mutation endpoints for the term plan: planned courses and unavailable
//! blocks. Every successful mutation invalidates the term's cached conflict
//! report so the next read recomputes against fresh state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::schedule::{project_occurrences, PlanError};
use crate::server::util::{plan_error_to_response, resolve_term};
use crate::types::AppState;

fn handle_failure(error: PlanError) -> Response {
    if error.is_user_error() {
        warn!("Plan mutation rejected: {}", error);
    } else {
        error!("Plan mutation failed: {}", error);
    }
    plan_error_to_response(error)
}

#[derive(Debug, Deserialize)]
pub struct AddSectionBody {
    pub crn: String,
}

/// POST /plan/:term/sections
/// Adds a section to the plan: one course event per meeting weekday,
/// committed atomically
pub async fn post_add_section(
    Path(term_code): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<AddSectionBody>,
) -> Response {
    info!("POST /plan/{}/sections crn={}", term_code, body.crn);

    match add_section_internal(&s, &term_code, &body.crn) {
        Ok(events_created) => (
            StatusCode::CREATED,
            Json(json!({
                "crn": body.crn,
                "events_created": events_created,
            })),
        )
            .into_response(),
        Err(e) => handle_failure(e),
    }
}

fn add_section_internal(
    state: &Arc<AppState>,
    term_code: &str,
    crn: &str,
) -> Result<usize, PlanError> {
    let term = resolve_term(term_code)?;
    let section = state
        .catalog
        .find_section(&term.code(), crn)
        .ok_or_else(|| PlanError::SectionNotFound {
            term: term_code.to_owned(),
            crn: crn.to_owned(),
        })?;

    // Asynchronous/TBA sections cannot be placed on the calendar; reject
    // with a user-facing message rather than committing an empty group.
    let placements =
        project_occurrences(section, term).ok_or_else(|| PlanError::Unschedulable {
            crn: crn.to_owned(),
        })?;

    let term_id = state.db.find_or_create_term(term.season, term.year)?;
    if state.db.crn_is_planned(term_id, crn) {
        return Err(PlanError::DuplicateSection {
            crn: crn.to_owned(),
        });
    }

    let occurrences: Vec<_> = placements
        .iter()
        .map(|placement| {
            (
                placement.first.and_time(placement.start_time),
                placement.first.and_time(placement.end_time),
            )
        })
        .collect();
    state.db.add_course(term_id, section, &occurrences)?;
    state.conflict_cache.invalidate(term_id);

    Ok(occurrences.len())
}

/// DELETE /plan/:term/sections/:crn
/// Removes every plan event sharing the CRN, as a unit
pub async fn delete_section(
    Path((term_code, crn)): Path<(String, String)>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /plan/{}/sections/{}", term_code, crn);

    match remove_section_internal(&s, &term_code, &crn) {
        Ok(()) => (StatusCode::OK, Json(json!({ "removed": crn }))).into_response(),
        Err(e) => handle_failure(e),
    }
}

fn remove_section_internal(
    state: &Arc<AppState>,
    term_code: &str,
    crn: &str,
) -> Result<(), PlanError> {
    let term = resolve_term(term_code)?;
    let not_found = || PlanError::SectionNotFound {
        term: term_code.to_owned(),
        crn: crn.to_owned(),
    };

    let term_id = state
        .db
        .find_term(term.season, term.year)?
        .ok_or_else(not_found)?;
    if !state.db.remove_course(term_id, crn)? {
        return Err(not_found());
    }
    state.conflict_cache.invalidate(term_id);
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LikedBody {
    pub liked: bool,
}

/// PUT /plan/:term/sections/:crn/liked
pub async fn put_section_liked(
    Path((term_code, crn)): Path<(String, String)>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<LikedBody>,
) -> Response {
    info!(
        "PUT /plan/{}/sections/{}/liked liked={}",
        term_code, crn, body.liked
    );

    let result = (|| -> Result<(), PlanError> {
        let term = resolve_term(&term_code)?;
        let not_found = || PlanError::SectionNotFound {
            term: term_code.clone(),
            crn: crn.clone(),
        };
        let term_id = s
            .db
            .find_term(term.season, term.year)?
            .ok_or_else(not_found)?;
        if !s.db.set_liked(term_id, &crn, body.liked)? {
            return Err(not_found());
        }
        Ok(())
    })();

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "crn": crn, "liked": body.liked })),
        )
            .into_response(),
        Err(e) => handle_failure(e),
    }
}

/// GET /plan/:term/sections
/// Lists the term's section membership rows (status and liked flag)
pub async fn get_plan_sections(
    Path(term_code): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /plan/{}/sections", term_code);

    let result = (|| -> Result<Vec<serde_json::Value>, PlanError> {
        let term = resolve_term(&term_code)?;
        let Some(term_id) = s.db.find_term(term.season, term.year)? else {
            return Ok(Vec::new());
        };
        let rows = s.db.list_section_statuses(term_id)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                json!({
                    "crn": row.crn,
                    "status": row.status,
                    "liked": row.liked,
                })
            })
            .collect())
    })();

    match result {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => handle_failure(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddUnavailableBody {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// POST /plan/:term/unavailable
/// Declares a one-off unavailable block
pub async fn post_add_unavailable(
    Path(term_code): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<AddUnavailableBody>,
) -> Response {
    info!("POST /plan/{}/unavailable title={}", term_code, body.title);

    let result = (|| -> Result<i64, PlanError> {
        let term = resolve_term(&term_code)?;
        let term_id = s.db.find_or_create_term(term.season, term.year)?;
        let event_id = s
            .db
            .add_unavailable(term_id, &body.title, body.start, body.end)?;
        s.conflict_cache.invalidate(term_id);
        Ok(event_id)
    })();

    match result {
        Ok(event_id) => (StatusCode::CREATED, Json(json!({ "id": event_id }))).into_response(),
        Err(e) => handle_failure(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveUnavailableBody {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// PATCH /plan/:term/unavailable/:id
/// Moves or resizes an unavailable block
pub async fn patch_unavailable(
    Path((term_code, event_id)): Path<(String, i64)>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<MoveUnavailableBody>,
) -> Response {
    info!("PATCH /plan/{}/unavailable/{}", term_code, event_id);

    let result = (|| -> Result<(), PlanError> {
        let term = resolve_term(&term_code)?;
        let term_id = s
            .db
            .find_term(term.season, term.year)?
            .ok_or(PlanError::EventNotFound { id: event_id })?;
        if !s
            .db
            .update_unavailable(term_id, event_id, body.start, body.end)?
        {
            return Err(PlanError::EventNotFound { id: event_id });
        }
        s.conflict_cache.invalidate(term_id);
        Ok(())
    })();

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": event_id }))).into_response(),
        Err(e) => handle_failure(e),
    }
}

/// DELETE /plan/:term/unavailable/:id
pub async fn delete_unavailable(
    Path((term_code, event_id)): Path<(String, i64)>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /plan/{}/unavailable/{}", term_code, event_id);

    let result = (|| -> Result<(), PlanError> {
        let term = resolve_term(&term_code)?;
        let term_id = s
            .db
            .find_term(term.season, term.year)?
            .ok_or(PlanError::EventNotFound { id: event_id })?;
        if !s.db.remove_unavailable(term_id, event_id)? {
            return Err(PlanError::EventNotFound { id: event_id });
        }
        s.conflict_cache.invalidate(term_id);
        Ok(())
    })();

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "removed": event_id }))).into_response(),
        Err(e) => handle_failure(e),
    }
}
