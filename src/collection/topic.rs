//! The topic collection: support channels tickets are filed against.
//!
//! Each topic is tied to one Discord channel and optionally carries a
//! broadcast secret key. The key is issued once and immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

use super::thing;

/// A topic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    /// Name of the system this topic covers.
    pub system: String,
    /// Discord channel notifications for this topic are mirrored to.
    pub discord_channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Thing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied topic fields. The secret key is never client-writable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicPayload {
    pub system: Option<String>,
    pub discord_channel_id: Option<String>,
    pub link_url: Option<String>,
    /// File record key of the topic image.
    pub image: Option<String>,
}

impl TopicPayload {
    pub fn into_fresh(self, owner: Option<&str>, now: DateTime<Utc>) -> Res<Topic> {
        let system = self.system.ok_or_else(|| DeskError::MalformedInput("Topic system name is required.".to_string()))?;
        let discord_channel_id = self.discord_channel_id.ok_or_else(|| DeskError::MalformedInput("Topic Discord channel id is required.".to_string()))?;

        Ok(Topic {
            id: None,
            system,
            discord_channel_id,
            secret_key: None,
            link_url: self.link_url,
            image: self.image.as_deref().map(|key| thing("file", key)),
            owner: owner.map(|key| thing("user", key)),
            created_at: now,
            updated_at: now,
        })
    }
}
