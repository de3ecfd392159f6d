//! The broadcast collection: announcements pollable through the public gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

use super::thing;

/// A broadcast record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    /// Topic this announcement belongs to.
    pub system: Thing,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<Thing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied broadcast fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastPayload {
    pub title: Option<String>,
    /// Topic record key.
    pub system: Option<String>,
    pub message: Option<String>,
    /// File record key of the attached picture.
    pub picture: Option<String>,
}

impl BroadcastPayload {
    pub fn into_fresh(self, now: DateTime<Utc>) -> Res<Broadcast> {
        let title = self.title.ok_or_else(|| DeskError::MalformedInput("Broadcast title is required.".to_string()))?;
        let system = self.system.ok_or_else(|| DeskError::MalformedInput("Broadcast topic is required.".to_string()))?;
        let message = self.message.ok_or_else(|| DeskError::MalformedInput("Broadcast message is required.".to_string()))?;

        Ok(Broadcast {
            id: None,
            title,
            system: thing("topic", &system),
            message,
            picture: self.picture.as_deref().map(|key| thing("file", key)),
            created_at: now,
            updated_at: now,
        })
    }
}
