//! Route definitions for the `/leads` resource, including CSV import and
//! the per-lead journey.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{journey, lead_import, leads};
use crate::state::AppState;

/// Routes mounted at `/leads`.
///
/// ```text
/// GET    /                        -> list_leads
/// POST   /                        -> create_lead
/// POST   /import                  -> import_leads (multipart)
/// GET    /imports                 -> list_imports
/// GET    /{id}                    -> get_lead
/// PUT    /{id}                    -> update_lead
/// DELETE /{id}                    -> delete_lead
/// PUT    /{id}/assign             -> assign_lead
/// GET    /{id}/journey            -> get_journey
/// PUT    /{id}/journey/{step}     -> set_step
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route("/import", post(lead_import::import_leads))
        .route("/imports", get(lead_import::list_imports))
        .route(
            "/{id}",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/{id}/assign", put(leads::assign_lead))
        .route("/{id}/journey", get(journey::get_journey))
        .route("/{id}/journey/{step}", put(journey::set_step))
}
