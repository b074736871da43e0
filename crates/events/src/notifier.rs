//! Email notification service.
//!
//! [`EmailNotifier`] subscribes to the [`EventBus`](crate::bus::EventBus),
//! works out who an event concerns, and emails each of them. It runs as a
//! long-lived background task and exits once the bus sender is dropped and
//! the channel has drained.

use std::collections::HashSet;

use solarfy_core::roles::{ROLE_ADMIN, ROLE_MANAGER};
use solarfy_core::types::DbId;
use solarfy_db::repositories::UserRepo;
use solarfy_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{
    PlatformEvent, EVENT_LEAD_ASSIGNED, EVENT_LEAD_IMPORT_COMPLETED,
    EVENT_PROJECT_REQUEST_REVIEWED, EVENT_TICKET_CREATED, EVENT_TICKET_RESPONDED,
};
use crate::delivery::email::EmailDelivery;
use crate::templates;

/// Roles that triage support tickets.
const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER];

/// Who an event should be delivered to, before database lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    Users(Vec<DbId>),
    Roles(&'static [&'static str]),
    Nobody,
}

/// Decide the audience of an event from its type and payload.
pub fn recipients_for(event: &PlatformEvent) -> Recipients {
    let user = |key: &str| match event.payload_id(key) {
        Some(id) => Recipients::Users(vec![id]),
        None => Recipients::Nobody,
    };

    match event.event_type.as_str() {
        EVENT_LEAD_ASSIGNED => user("assignee_id"),
        EVENT_TICKET_CREATED => Recipients::Roles(STAFF_ROLES),
        EVENT_TICKET_RESPONDED => {
            let creator = event.payload_id("created_by");
            let internal = event
                .payload
                .get("is_internal")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            match creator {
                // Staff replied to the customer-facing thread.
                Some(creator) if !internal && event.actor_user_id != Some(creator) => {
                    Recipients::Users(vec![creator])
                }
                _ => Recipients::Roles(STAFF_ROLES),
            }
        }
        EVENT_PROJECT_REQUEST_REVIEWED => user("requested_by"),
        EVENT_LEAD_IMPORT_COMPLETED => match event.actor_user_id {
            Some(id) => Recipients::Users(vec![id]),
            None => Recipients::Nobody,
        },
        _ => Recipients::Nobody,
    }
}

/// Whether the acting user should be left off the recipient list.
///
/// The importer is the audience of their own import summary; for every
/// other event, people are not told about what they just did.
fn excludes_actor(event: &PlatformEvent) -> bool {
    event.event_type != EVENT_LEAD_IMPORT_COMPLETED
}

/// Background service that turns platform events into emails.
pub struct EmailNotifier {
    pool: DbPool,
    delivery: EmailDelivery,
}

impl EmailNotifier {
    pub fn new(pool: DbPool, delivery: EmailDelivery) -> Self {
        Self { pool, delivery }
    }

    /// Run the notification loop until the event bus is closed.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Email notifier lagged, some notifications were not sent"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email notifier shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) {
        let Some(email) = templates::render(event) else {
            return;
        };

        let addresses = match self.resolve(event).await {
            Ok(addresses) => addresses,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    tenant_id = event.tenant_id,
                    "Failed to resolve notification recipients"
                );
                return;
            }
        };

        for to in addresses {
            if let Err(e) = self.delivery.deliver(&to, &email).await {
                tracing::error!(
                    error = %e,
                    to = %to,
                    event_type = %event.event_type,
                    "Failed to send notification email"
                );
            }
        }
    }

    /// Look up the email addresses of active recipients in the event's tenant.
    async fn resolve(&self, event: &PlatformEvent) -> Result<Vec<String>, sqlx::Error> {
        let skip = if excludes_actor(event) {
            event.actor_user_id
        } else {
            None
        };

        let mut users: Vec<(DbId, String)> = Vec::new();
        match recipients_for(event) {
            Recipients::Nobody => {}
            Recipients::Users(ids) => {
                for id in ids {
                    if let Some(user) =
                        UserRepo::find_in_tenant(&self.pool, event.tenant_id, id).await?
                    {
                        if user.is_active {
                            users.push((user.id, user.email));
                        }
                    }
                }
            }
            Recipients::Roles(roles) => {
                for user in
                    UserRepo::list_active_with_roles(&self.pool, event.tenant_id, roles).await?
                {
                    users.push((user.id, user.email));
                }
            }
        }

        let mut seen = HashSet::new();
        Ok(users
            .into_iter()
            .filter(|(id, _)| Some(*id) != skip)
            .filter(|(_, email)| seen.insert(email.to_lowercase()))
            .map(|(_, email)| email)
            .collect())
    }
}
