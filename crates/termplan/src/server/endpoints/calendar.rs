use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::{materialize_calendar, CalendarEvent, PlanError};
use crate::server::util::{conflict_report, load_snapshot, plan_error_to_response, resolve_term};
use crate::types::AppState;

/// GET /plan/:term/calendar
/// Returns the term's committed plan as renderable calendar events:
/// weekly-recurring course placements and one-off unavailable blocks, with
/// conflict-highlighting metadata
pub async fn get_calendar(
    Path(term_code): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /plan/{}/calendar", term_code);

    let result = (|| -> Result<Vec<CalendarEvent>, PlanError> {
        let term = resolve_term(&term_code)?;
        let Some(term_id) = s.db.find_term(term.season, term.year)? else {
            return Ok(Vec::new());
        };
        let snapshot = load_snapshot(&s, term, term_id)?;
        let report = conflict_report(&s, term, term_id)?;
        Ok(materialize_calendar(&snapshot, term, &report))
    })();

    match result {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => {
            if !e.is_user_error() {
                error!("Failed to materialize calendar: {}", e);
            }
            plan_error_to_response(e)
        }
    }
}
