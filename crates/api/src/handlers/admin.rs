//! Handlers for the `/admin` resource (tenant user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`] and only ever
//! touch users of the admin's own tenant.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use solarfy_core::billing::check_limit;
use solarfy_core::error::CoreError;
use solarfy_core::types::DbId;
use solarfy_core::validation::{is_valid_email, normalize_email};
use solarfy_db::models::role::Role;
use solarfy_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use solarfy_db::repositories::{RoleRepo, SessionRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Role name, e.g. `"sales_rep"`.
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list_for_tenant(&state.pool, admin.tenant_id).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/users
///
/// Create a user in the admin's tenant, subject to the plan's seat limit.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    state.ensure_writable(admin.tenant_id).await?;

    if !is_valid_email(&input.email) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".into(),
        )));
    }
    let full_name = input.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Full name must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = find_role(&state, &input.role).await?;

    check_seat_available(&state, admin.tenant_id).await?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            tenant_id: admin.tenant_id,
            email: normalize_email(&input.email),
            full_name: full_name.to_string(),
            password_hash: hashed,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        tenant_id = admin.tenant_id,
        role = %role.name,
        created_by = admin.user_id,
        "User created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(&user, role.name),
        }),
    ))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = find_user(&state, admin.tenant_id, id).await?;
    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update name, role, or active flag. Reactivation counts against the seat
/// limit; admins cannot deactivate or demote themselves.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    state.ensure_writable(admin.tenant_id).await?;
    let current = find_user(&state, admin.tenant_id, id).await?;

    if let Some(name) = &input.full_name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Full name must not be empty".into(),
            )));
        }
    }

    let role = match &input.role {
        Some(name) => Some(find_role(&state, name).await?),
        None => None,
    };

    if id == admin.user_id {
        if input.is_active == Some(false) {
            return Err(cannot_deactivate_self());
        }
        if role.as_ref().is_some_and(|r| r.id != current.role_id) {
            return Err(AppError::Core(CoreError::Validation(
                "You cannot change your own role".into(),
            )));
        }
    }

    if input.is_active == Some(true) && !current.is_active {
        check_seat_available(&state, admin.tenant_id).await?;
    }

    let update = UpdateUser {
        full_name: input.full_name.map(|n| n.trim().to_string()),
        role_id: role.as_ref().map(|r| r.id),
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, admin.tenant_id, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");

    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/admin/users/{id}/deactivate
///
/// Deactivate a user and revoke their sessions. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(cannot_deactivate_self());
    }
    let deactivated = UserRepo::deactivate(&state.pool, admin.tenant_id, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, deactivated_by = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Admin-initiated password reset. Clears any lockout and signs the user out.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let updated = UserRepo::update_password(&state.pool, admin.tenant_id, id, &hashed).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, reset_by = admin.user_id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cannot_deactivate_self() -> AppError {
    AppError::Core(CoreError::Validation(
        "You cannot deactivate your own account".into(),
    ))
}

async fn find_user(state: &AppState, tenant_id: DbId, id: DbId) -> AppResult<User> {
    UserRepo::find_in_tenant(&state.pool, tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

async fn find_role(state: &AppState, name: &str) -> AppResult<Role> {
    RoleRepo::find_by_name(&state.pool, name).await?.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Unknown role '{name}'")))
    })
}

/// Fail when the tenant's plan has no free seat for another active user.
async fn check_seat_available(state: &AppState, tenant_id: DbId) -> AppResult<()> {
    let plan = state.plan(tenant_id).await?;
    let active = UserRepo::count_active(&state.pool, tenant_id).await?;
    check_limit(plan.limits().max_users, active, 1, "users")?;
    Ok(())
}

/// Convert a [`User`] row into a safe [`UserResponse`] by resolving the role name.
async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}
