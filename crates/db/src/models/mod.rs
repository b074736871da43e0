//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod dashboard;
pub mod journey;
pub mod lead;
pub mod lead_import;
pub mod project;
pub mod project_image;
pub mod project_request;
pub mod role;
pub mod session;
pub mod subscription;
pub mod support_ticket;
pub mod tenant;
pub mod user;
