//! Handlers for the `/tickets` resource (support tickets and responses).
//!
//! Ticket creators see their own tickets and the public responses on them.
//! Users with `tickets.manage` see every ticket in the tenant, can triage
//! them, and can leave internal notes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use solarfy_core::error::CoreError;
use solarfy_core::roles::Permission;
use solarfy_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use solarfy_core::support_ticket::{
    validate_body, validate_priority, validate_status, validate_subject, validate_transition,
};
use solarfy_core::types::DbId;
use solarfy_db::models::support_ticket::{
    CreateSupportTicket, CreateTicketResponse, SupportTicket, TicketListParams,
    TicketWithResponses, UpdateSupportTicket,
};
use solarfy_db::repositories::{SupportTicketRepo, UserRepo};
use solarfy_events::bus::{EVENT_TICKET_CREATED, EVENT_TICKET_RESPONDED};
use solarfy_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<CreateSupportTicket>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::TicketsCreate)?;
    input.subject = input.subject.trim().to_string();
    validate_subject(&input.subject)?;
    validate_body(&input.description)?;
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }

    let ticket = SupportTicketRepo::create(&state.pool, user.tenant_id, user.user_id, &input).await?;
    tracing::info!(
        ticket_id = ticket.id,
        tenant_id = user.tenant_id,
        priority = %ticket.priority,
        created_by = user.user_id,
        "Support ticket opened",
    );

    state.publish(
        PlatformEvent::new(EVENT_TICKET_CREATED, user.tenant_id)
            .with_source("support_ticket", ticket.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "ticket_id": ticket.id,
                "subject": ticket.subject,
                "priority": ticket.priority,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TicketListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        validate_status(status)?;
    }
    if let Some(priority) = &params.priority {
        validate_priority(priority)?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let tickets = SupportTicketRepo::list_filtered(
        &state.pool,
        user.tenant_id,
        &params,
        own_scope(&user),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
///
/// The ticket with its responses. Internal notes are only included for
/// users who manage tickets.
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, &user, id).await?;
    let responses = SupportTicketRepo::list_responses(
        &state.pool,
        ticket.id,
        user.can(Permission::TicketsManage),
    )
    .await?;
    Ok(Json(DataResponse {
        data: TicketWithResponses { ticket, responses },
    }))
}

/// PATCH /api/v1/tickets/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSupportTicket>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::TicketsManage)?;
    let existing = find_ticket(&state, &user, id).await?;

    if let Some(next) = &input.status {
        validate_transition(&existing.status, next)?;
    }
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }
    if let Some(assignee) = input.assigned_to {
        match UserRepo::find_in_tenant(&state.pool, user.tenant_id, assignee).await? {
            Some(u) if u.is_active => {}
            _ => {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "User {assignee} cannot be assigned tickets"
                ))))
            }
        }
    }

    let ticket = SupportTicketRepo::update(&state.pool, user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SupportTicket",
            id,
        }))?;

    tracing::info!(
        ticket_id = id,
        status = %ticket.status,
        priority = %ticket.priority,
        assigned_to = ?ticket.assigned_to,
        updated_by = user.user_id,
        "Support ticket updated",
    );
    Ok(Json(DataResponse { data: ticket }))
}

/// POST /api/v1/tickets/{id}/responses
pub async fn add_response(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTicketResponse>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, &user, id).await?;
    if input.is_internal {
        user.require(Permission::TicketsManage)?;
    }
    validate_body(&input.body)?;

    let response = SupportTicketRepo::add_response(&state.pool, ticket.id, user.user_id, &input).await?;
    tracing::info!(
        ticket_id = id,
        response_id = response.id,
        internal = response.is_internal,
        author_id = user.user_id,
        "Ticket response added",
    );

    state.publish(
        PlatformEvent::new(EVENT_TICKET_RESPONDED, user.tenant_id)
            .with_source("support_ticket", ticket.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "ticket_id": ticket.id,
                "subject": ticket.subject,
                "created_by": ticket.created_by,
                "is_internal": response.is_internal,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn own_scope(user: &AuthUser) -> Option<DbId> {
    if user.can(Permission::TicketsManage) {
        None
    } else {
        Some(user.user_id)
    }
}

async fn find_ticket(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<SupportTicket> {
    let scope = own_scope(user);
    SupportTicketRepo::find_by_id(&state.pool, user.tenant_id, id)
        .await?
        .filter(|t| scope.map_or(true, |uid| t.created_by == uid))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SupportTicket",
            id,
        }))
}
