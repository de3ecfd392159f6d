//! The ticket collection: support requests filed against a topic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

use super::thing;

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    Repairing,
    Resolved,
}

/// Deadline window a ticket was filed under. Smaller windows are hotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketPriority {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "72h")]
    ThreeDays,
    #[serde(rename = "168h")]
    Week,
}

impl TicketPriority {
    /// The wire/display form of the deadline window.
    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Day => "24h",
            TicketPriority::ThreeDays => "72h",
            TicketPriority::Week => "168h",
        }
    }

    /// The time a ticket of this priority may stay unresolved before it is
    /// considered urgent.
    pub fn window(&self) -> Duration {
        match self {
            TicketPriority::Day => Duration::hours(24),
            TicketPriority::ThreeDays => Duration::hours(72),
            TicketPriority::Week => Duration::hours(168),
        }
    }
}

/// A ticket record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub topic: Thing,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_changed_by: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Thing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// A ticket is urgent when it is unresolved and older than its priority window.
    pub fn is_urgent(&self, now: DateTime<Utc>) -> bool {
        self.status != TicketStatus::Resolved && now - self.created_at > self.priority.window()
    }
}

/// Client-supplied ticket fields. With no `id` this inserts a fresh ticket;
/// with an `id` it updates the existing record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPayload {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Topic record key.
    pub topic: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub description: Option<String>,
    pub observation: Option<String>,
    /// File record key of the attached image.
    pub attached: Option<String>,
    /// Comment record key; an update setting this fires the comment notification.
    pub comment: Option<String>,
}

impl TicketPayload {
    /// Materialize a fresh ticket from the payload. Fresh tickets default to
    /// `Open`; the owner is fixed from the caller here and never rewritten.
    pub fn into_fresh(self, owner: Option<&str>, now: DateTime<Utc>) -> Res<Ticket> {
        let title = self.title.ok_or_else(|| DeskError::MalformedInput("Ticket title is required.".to_string()))?;
        let topic = self.topic.ok_or_else(|| DeskError::MalformedInput("Ticket topic is required.".to_string()))?;
        let priority = self.priority.ok_or_else(|| DeskError::MalformedInput("Ticket priority is required.".to_string()))?;
        let description = self.description.ok_or_else(|| DeskError::MalformedInput("Ticket description is required.".to_string()))?;

        Ok(Ticket {
            id: None,
            title,
            topic: thing("topic", &topic),
            status: self.status.unwrap_or(TicketStatus::Open),
            priority,
            description,
            observation: self.observation,
            attached: self.attached.as_deref().map(|key| thing("file", key)),
            status_changed_by: None,
            comment: None,
            owner: owner.map(|key| thing("user", key)),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the payload to an existing ticket. Owner and creation time are
    /// immutable; a status change records who made it.
    pub fn apply_to(self, existing: Ticket, caller: Option<&str>, now: DateTime<Utc>) -> Ticket {
        let status = self.status.unwrap_or(existing.status);
        let status_changed_by = if status != existing.status {
            caller.map(|key| thing("user", key))
        } else {
            existing.status_changed_by
        };

        Ticket {
            id: existing.id,
            title: self.title.unwrap_or(existing.title),
            topic: self.topic.as_deref().map(|key| thing("topic", key)).unwrap_or(existing.topic),
            status,
            priority: self.priority.unwrap_or(existing.priority),
            description: self.description.unwrap_or(existing.description),
            observation: self.observation.or(existing.observation),
            attached: self.attached.as_deref().map(|key| thing("file", key)).or(existing.attached),
            status_changed_by,
            comment: self.comment.as_deref().map(|key| thing("comment", key)).or(existing.comment),
            owner: existing.owner,
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: TicketStatus, priority: TicketPriority, age: Duration, now: DateTime<Utc>) -> Ticket {
        Ticket {
            id: None,
            title: "Printer on fire".to_string(),
            topic: thing("topic", "printers"),
            status,
            priority,
            description: "It is on fire.".to_string(),
            observation: None,
            attached: None,
            status_changed_by: None,
            comment: None,
            owner: None,
            created_at: now - age,
            updated_at: now - age,
        }
    }

    #[test]
    fn unresolved_tickets_past_their_window_are_urgent() {
        let now = Utc::now();

        assert!(sample(TicketStatus::Open, TicketPriority::Day, Duration::hours(25), now).is_urgent(now));
        assert!(sample(TicketStatus::Repairing, TicketPriority::ThreeDays, Duration::hours(100), now).is_urgent(now));
    }

    #[test]
    fn young_or_resolved_tickets_are_not_urgent() {
        let now = Utc::now();

        assert!(!sample(TicketStatus::Open, TicketPriority::Day, Duration::hours(1), now).is_urgent(now));
        assert!(!sample(TicketStatus::Open, TicketPriority::Week, Duration::hours(100), now).is_urgent(now));
        assert!(!sample(TicketStatus::Resolved, TicketPriority::Day, Duration::hours(500), now).is_urgent(now));
    }

    #[test]
    fn fresh_ticket_defaults_to_open_and_fixes_owner() {
        let now = Utc::now();
        let payload = TicketPayload {
            title: Some("VPN down".to_string()),
            topic: Some("network".to_string()),
            priority: Some(TicketPriority::Day),
            description: Some("No tunnel.".to_string()),
            ..Default::default()
        };

        let ticket = payload.into_fresh(Some("alice"), now).unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.owner, Some(thing("user", "alice")));
        assert_eq!(ticket.created_at, now);
    }

    #[test]
    fn fresh_ticket_requires_mandatory_fields() {
        let payload = TicketPayload {
            title: Some("VPN down".to_string()),
            ..Default::default()
        };

        assert!(payload.into_fresh(None, Utc::now()).is_err());
    }

    #[test]
    fn update_preserves_owner_and_records_status_changer() {
        let now = Utc::now();
        let existing = {
            let mut t = sample(TicketStatus::Open, TicketPriority::Day, Duration::hours(2), now);
            t.owner = Some(thing("user", "alice"));
            t
        };

        let updated = TicketPayload {
            status: Some(TicketStatus::Repairing),
            ..Default::default()
        }
        .apply_to(existing, Some("bob"), now);

        assert_eq!(updated.owner, Some(thing("user", "alice")));
        assert_eq!(updated.status_changed_by, Some(thing("user", "bob")));
        assert_eq!(updated.status, TicketStatus::Repairing);
    }
}
