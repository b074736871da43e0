//! Route definitions for the `/project-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project_requests;
use crate::state::AppState;

/// Routes mounted at `/project-requests`.
///
/// ```text
/// GET    /               -> list_requests
/// POST   /               -> create_request
/// GET    /{id}           -> get_request
/// POST   /{id}/review    -> review_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project_requests::list_requests).post(project_requests::create_request),
        )
        .route("/{id}", get(project_requests::get_request))
        .route("/{id}/review", post(project_requests::review_request))
}
