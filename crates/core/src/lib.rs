//! Solarfy domain core.
//!
//! Pure domain logic shared by the API, repository, and notification layers:
//! error types, role/permission tables, input validation, the CSV lead
//! importer, and status transition rules. Nothing in this crate performs I/O.

pub mod billing;
pub mod csv_import;
pub mod customer_type;
pub mod error;
pub mod journey;
pub mod lead;
pub mod navigation;
pub mod project;
pub mod project_image;
pub mod project_request;
pub mod roles;
pub mod search;
pub mod support_ticket;
pub mod tenant;
pub mod types;
pub mod validation;
