use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::server::endpoints::{calendar, conflicts, plan, sections, status};
use crate::types::AppState;

pub mod cache;
mod endpoints;
mod types;
mod util;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Term-scoped plan endpoints
    let plan_router = Router::new()
        .route(
            "/sections",
            get(plan::get_plan_sections).post(plan::post_add_section),
        )
        .route("/sections/:crn", delete(plan::delete_section))
        .route("/sections/:crn/liked", put(plan::put_section_liked))
        .route("/unavailable", post(plan::post_add_unavailable))
        .route(
            "/unavailable/:id",
            patch(plan::patch_unavailable).delete(plan::delete_unavailable),
        )
        .route("/conflicts", get(conflicts::get_conflicts))
        .route("/calendar", get(calendar::get_calendar));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/terms", get(sections::get_terms))
        .route("/terms/:term/sections", get(sections::get_sections))
        .nest("/plan/:term", plan_router)
        .with_state(app_state)
}
