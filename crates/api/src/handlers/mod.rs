//! HTTP handlers, one module per resource.
//!
//! Handlers extract the caller, check permissions and subscription standing,
//! call into `solarfy_core` for validation and `solarfy_db` repositories for
//! persistence, and publish platform events for anything worth notifying.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod journey;
pub mod lead_import;
pub mod leads;
pub mod monitoring;
pub mod navigation;
pub mod project_images;
pub mod project_requests;
pub mod projects;
pub mod tickets;
