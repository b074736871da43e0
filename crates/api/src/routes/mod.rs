pub mod admin;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod health;
pub mod leads;
pub mod project_requests;
pub mod projects;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   sign up a company (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user, permissions, navigation
///
/// /navigation                                      role-filtered sidebar
/// /dashboard/summary                               tenant counters
///
/// /leads                                           list, create
/// /leads/import                                    CSV import (multipart)
/// /leads/imports                                   import history
/// /leads/{id}                                      get, update, delete
/// /leads/{id}/assign                               assign (managers, admins)
/// /leads/{id}/journey                              journey milestones
/// /leads/{id}/journey/{step}                       complete / reopen a step
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/monitoring                        live Enphase summary
/// /projects/{id}/images                            list, upload
/// /projects/{id}/images/{image_id}                 delete
/// /projects/{id}/images/{image_id}/file            download
///
/// /project-requests                                list, create
/// /project-requests/{id}                           get
/// /project-requests/{id}/review                    approve / reject
///
/// /tickets                                         list, create
/// /tickets/{id}                                    get (with responses), update
/// /tickets/{id}/responses                          respond
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update
/// /admin/users/{id}/deactivate                     deactivate
/// /admin/users/{id}/reset-password                 reset password
/// /admin/roles                                     list roles
///
/// /billing/plans                                   plan catalogue (public)
/// /billing/subscription                            current standing and usage
/// /billing/checkout                                Stripe Checkout (admin only)
/// /billing/webhook                                 Stripe webhook (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/navigation", get(handlers::navigation::get_navigation))
        .nest("/dashboard", dashboard::router())
        .nest("/leads", leads::router())
        .nest("/projects", projects::router())
        .nest("/project-requests", project_requests::router())
        .nest("/tickets", tickets::router())
        .nest("/admin", admin::router())
        .nest("/billing", billing::router())
}
