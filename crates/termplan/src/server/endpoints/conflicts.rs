use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::PlanError;
use crate::server::util::{conflict_report, plan_error_to_response, resolve_term};
use crate::types::AppState;

/// GET /plan/:term/conflicts
/// Returns the full conflict report for the term's committed plan, plus the
/// count shown on the dashboard badge
pub async fn get_conflicts(
    Path(term_code): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /plan/{}/conflicts", term_code);

    let result = (|| -> Result<serde_json::Value, PlanError> {
        let term = resolve_term(&term_code)?;
        let Some(term_id) = s.db.find_term(term.season, term.year)? else {
            // Nothing committed yet.
            return Ok(json!({ "conflicts": [], "count": 0, "courses": [] }));
        };
        let report = conflict_report(&s, term, term_id)?;
        Ok(json!({
            "conflicts": report.records(),
            "count": report.len(),
            "courses": report.flagged_courses().collect::<Vec<_>>(),
        }))
    })();

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            if !e.is_user_error() {
                error!("Failed to compute conflicts: {}", e);
            }
            plan_error_to_response(e)
        }
    }
}
