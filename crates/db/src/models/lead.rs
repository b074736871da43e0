//! Lead entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use solarfy_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub product_services: Vec<String>,
    pub status: String,
    pub customer_type: Option<String>,
    pub reference: Option<String>,
    pub source: String,
    pub notes: Option<String>,
    pub assigned_to: Option<DbId>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lead by hand.
///
/// Email and phone are stored in normalised form; the handler normalises
/// them after validation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateLead {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_state"))]
    pub state: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_zip"))]
    pub zip: Option<String>,
    #[serde(default)]
    pub product_services: Vec<String>,
    pub customer_type: Option<String>,
    #[validate(length(max = 100, message = "Reference is too long"))]
    pub reference: Option<String>,
    pub source: Option<String>,
    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
    pub assigned_to: Option<DbId>,
}

/// DTO for updating a lead. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLead {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_phone"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_state"))]
    pub state: Option<String>,
    #[validate(custom(function = "solarfy_core::validation::validate_zip"))]
    pub zip: Option<String>,
    pub product_services: Option<Vec<String>>,
    pub status: Option<String>,
    pub customer_type: Option<String>,
    #[validate(length(max = 100, message = "Reference is too long"))]
    pub reference: Option<String>,
    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

/// A lead row ready for bulk insert from a CSV import.
#[derive(Debug, Clone)]
pub struct ImportedLead {
    /// CSV line the row came from.
    pub line: usize,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub reference: Option<String>,
    pub customer_type: Option<String>,
    /// Set when a sales rep imports, so the rows stay visible to them.
    pub assigned_to: Option<DbId>,
}

/// Query parameters for listing leads.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub customer_type: Option<String>,
    pub assigned_to: Option<DbId>,
    /// Case-insensitive match on name or email.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `PUT /leads/{id}/assign`. `null` unassigns.
#[derive(Debug, Deserialize)]
pub struct AssignLead {
    pub user_id: Option<DbId>,
}
