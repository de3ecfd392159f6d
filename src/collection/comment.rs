//! The comment collection: staff and user replies attached to a ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

use super::thing;

/// A comment may carry at most this many attached images.
pub const MAX_IMAGES: usize = 3;

/// A comment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub ticket: Thing,
    pub description: String,
    #[serde(default)]
    pub images: Vec<Thing>,
    #[serde(default)]
    pub liked_by: Vec<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Thing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied comment fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    /// Ticket record key the comment belongs to.
    pub ticket: Option<String>,
    pub description: Option<String>,
    /// File record keys of attached images.
    #[serde(default)]
    pub images: Vec<String>,
}

impl CommentPayload {
    /// Materialize a fresh comment; the owner is fixed from the caller.
    pub fn into_fresh(self, owner: Option<&str>, now: DateTime<Utc>) -> Res<Comment> {
        let ticket = self.ticket.ok_or_else(|| DeskError::MalformedInput("Comment ticket is required.".to_string()))?;
        let description = self.description.ok_or_else(|| DeskError::MalformedInput("Comment description is required.".to_string()))?;

        if self.images.len() > MAX_IMAGES {
            return Err(DeskError::MalformedInput(format!("A comment may carry at most {MAX_IMAGES} images.")).into());
        }

        Ok(Comment {
            id: None,
            ticket: thing("ticket", &ticket),
            description,
            images: self.images.iter().map(|key| thing("file", key)).collect(),
            liked_by: Vec::new(),
            owner: owner.map(|key| thing("user", key)),
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_comment_requires_ticket_and_description() {
        let payload = CommentPayload {
            description: Some("Looks like a fuse.".to_string()),
            ..Default::default()
        };

        assert!(payload.into_fresh(Some("bob"), Utc::now()).is_err());
    }

    #[test]
    fn fresh_comment_rejects_too_many_images() {
        let payload = CommentPayload {
            ticket: Some("t1".to_string()),
            description: Some("Photos attached.".to_string()),
            images: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };

        assert!(payload.into_fresh(Some("bob"), Utc::now()).is_err());
    }
}
