//! Plain-text email templates, one per notification event type.

use crate::bus::{
    PlatformEvent, EVENT_LEAD_ASSIGNED, EVENT_LEAD_IMPORT_COMPLETED,
    EVENT_PROJECT_REQUEST_REVIEWED, EVENT_TICKET_CREATED, EVENT_TICKET_RESPONDED,
};

/// Subject and body of a notification email. The delivery layer adds the
/// product prefix to the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Render the email for `event`, or `None` for event types that do not
/// notify anyone by email.
pub fn render(event: &PlatformEvent) -> Option<RenderedEmail> {
    let entity_id = event.source_entity_id.unwrap_or_default();
    let rendered = match event.event_type.as_str() {
        EVENT_LEAD_ASSIGNED => {
            let name = event.payload_str("lead_name").unwrap_or("A lead");
            RenderedEmail {
                subject: format!("Lead assigned: {name}"),
                body: format!(
                    "{name} has been assigned to you.\n\nOpen lead #{entity_id} in Solarfy to follow up."
                ),
            }
        }
        EVENT_TICKET_CREATED => {
            let subject = event.payload_str("subject").unwrap_or("(no subject)");
            let priority = event.payload_str("priority").unwrap_or("normal");
            RenderedEmail {
                subject: format!("New support ticket #{entity_id}: {subject}"),
                body: format!(
                    "A new support ticket was opened.\n\nSubject: {subject}\nPriority: {priority}"
                ),
            }
        }
        EVENT_TICKET_RESPONDED => {
            let subject = event.payload_str("subject").unwrap_or("(no subject)");
            RenderedEmail {
                subject: format!("New response on ticket #{entity_id}: {subject}"),
                body: format!(
                    "Ticket #{entity_id} \"{subject}\" has a new response.\n\nSign in to Solarfy to read it."
                ),
            }
        }
        EVENT_PROJECT_REQUEST_REVIEWED => {
            let lead = event.payload_str("lead_name").unwrap_or("your lead");
            let status = event.payload_str("status").unwrap_or("reviewed");
            let mut body = format!("Your project request for {lead} was {status}.");
            if let Some(notes) = event.payload_str("review_notes").filter(|n| !n.is_empty()) {
                body.push_str(&format!("\n\nReviewer notes:\n{notes}"));
            }
            RenderedEmail {
                subject: format!("Project request {status}: {lead}"),
                body,
            }
        }
        EVENT_LEAD_IMPORT_COMPLETED => {
            let file = event.payload_str("file_name").unwrap_or("your file");
            let imported = event.payload_id("imported").unwrap_or(0);
            let duplicates = event.payload_id("duplicates").unwrap_or(0);
            let errors = event.payload_id("errors").unwrap_or(0);
            RenderedEmail {
                subject: format!("Lead import finished: {file}"),
                body: format!(
                    "Import of {file} finished.\n\nImported: {imported}\nDuplicates skipped: {duplicates}\nRows with errors: {errors}"
                ),
            }
        }
        _ => return None,
    };
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lead_assigned_mentions_lead_name() {
        let event = PlatformEvent::new(EVENT_LEAD_ASSIGNED, 1)
            .with_source("lead", 12)
            .with_payload(json!({"lead_name": "Jane Doe", "assignee_id": 4}));
        let email = render(&event).unwrap();
        assert_eq!(email.subject, "Lead assigned: Jane Doe");
        assert!(email.body.contains("#12"));
    }

    #[test]
    fn rejected_request_includes_reviewer_notes() {
        let event = PlatformEvent::new(EVENT_PROJECT_REQUEST_REVIEWED, 1)
            .with_source("project_request", 3)
            .with_payload(json!({
                "lead_name": "Sam",
                "status": "rejected",
                "review_notes": "Roof too shaded"
            }));
        let email = render(&event).unwrap();
        assert_eq!(email.subject, "Project request rejected: Sam");
        assert!(email.body.ends_with("Roof too shaded"));
    }

    #[test]
    fn import_summary_lists_counts() {
        let event = PlatformEvent::new(EVENT_LEAD_IMPORT_COMPLETED, 1).with_payload(json!({
            "file_name": "leads.csv",
            "imported": 40,
            "duplicates": 2,
            "errors": 1
        }));
        let body = render(&event).unwrap().body;
        assert!(body.contains("Imported: 40"));
        assert!(body.contains("Duplicates skipped: 2"));
        assert!(body.contains("Rows with errors: 1"));
    }

    #[test]
    fn unknown_event_renders_nothing() {
        assert!(render(&PlatformEvent::new("lead.created", 1)).is_none());
    }
}
