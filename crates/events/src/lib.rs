//! Solarfy event bus and email notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope, always tenant-scoped.
//! - [`templates`]: subject/body rendering per event type.
//! - [`EmailNotifier`]: background service that emails the people an
//!   event concerns.

pub mod bus;
pub mod delivery;
pub mod notifier;
pub mod templates;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::EmailNotifier;
