//! Route definitions for the `/projects` resource and its images and
//! monitoring sub-resources.

use axum::routing::get;
use axum::Router;

use crate::handlers::{monitoring, project_images, projects};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                              -> list_projects
/// POST   /                              -> create_project
/// GET    /{id}                          -> get_project
/// PUT    /{id}                          -> update_project
/// DELETE /{id}                          -> delete_project
/// GET    /{id}/monitoring               -> get_monitoring
/// GET    /{id}/images                   -> list_images
/// POST   /{id}/images                   -> upload_image (multipart)
/// GET    /{id}/images/{image_id}/file   -> download_image
/// DELETE /{id}/images/{image_id}        -> delete_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/{id}/monitoring", get(monitoring::get_monitoring))
        .route(
            "/{id}/images",
            get(project_images::list_images).post(project_images::upload_image),
        )
        .route(
            "/{id}/images/{image_id}/file",
            get(project_images::download_image),
        )
        .route(
            "/{id}/images/{image_id}",
            axum::routing::delete(project_images::delete_image),
        )
}
