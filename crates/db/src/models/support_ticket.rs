//! Support ticket and response models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};

/// A row from the `support_tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupportTicket {
    pub id: DbId,
    pub tenant_id: DbId,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `ticket_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketResponse {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: Option<DbId>,
    pub body: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupportTicket {
    pub subject: String,
    pub description: String,
    pub priority: Option<String>,
}

/// DTO for `PATCH /tickets/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSupportTicket {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
}

/// DTO for adding a response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketResponse {
    pub body: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Query parameters for listing tickets.
#[derive(Debug, Default, Deserialize)]
pub struct TicketListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A ticket together with the responses the caller may see.
#[derive(Debug, Clone, Serialize)]
pub struct TicketWithResponses {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub responses: Vec<TicketResponse>,
}
