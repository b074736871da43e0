//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query on tenant-owned
//! data takes the caller's `tenant_id` and filters on it.

pub mod dashboard_repo;
pub mod journey_repo;
pub mod lead_import_repo;
pub mod lead_repo;
pub mod project_image_repo;
pub mod project_repo;
pub mod project_request_repo;
pub mod role_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod support_ticket_repo;
pub mod tenant_repo;
pub mod user_repo;

pub use dashboard_repo::DashboardRepo;
pub use journey_repo::JourneyRepo;
pub use lead_import_repo::LeadImportRepo;
pub use lead_repo::LeadRepo;
pub use project_image_repo::ProjectImageRepo;
pub use project_repo::ProjectRepo;
pub use project_request_repo::ProjectRequestRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use support_ticket_repo::SupportTicketRepo;
pub use tenant_repo::TenantRepo;
pub use user_repo::UserRepo;
