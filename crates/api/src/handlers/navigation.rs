//! Handler for the role-filtered sidebar navigation.

use axum::Json;
use solarfy_core::navigation::{visible_navigation, NavItem};

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// GET /api/v1/navigation
///
/// Pages the caller's role may open, in display order.
pub async fn get_navigation(user: AuthUser) -> Json<DataResponse<Vec<NavItem>>> {
    Json(DataResponse {
        data: visible_navigation(&user.role),
    })
}
