//! The file collection: metadata for stored uploads.
//!
//! Upload mechanics live outside this crate; file records only describe where
//! the bytes live (`absolute_path` on disk, `download_link` over HTTP) so that
//! notifications can forward them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

/// A file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub absolute_path: String,
    pub download_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Thing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied file metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilePayload {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub absolute_path: Option<String>,
    pub download_link: Option<String>,
}

impl FilePayload {
    pub fn into_fresh(self, owner: Option<&str>, now: DateTime<Utc>) -> Res<FileRecord> {
        let name = self.name.ok_or_else(|| DeskError::MalformedInput("File name is required.".to_string()))?;
        let absolute_path = self.absolute_path.ok_or_else(|| DeskError::MalformedInput("File absolute path is required.".to_string()))?;
        let download_link = self.download_link.ok_or_else(|| DeskError::MalformedInput("File download link is required.".to_string()))?;

        Ok(FileRecord {
            id: None,
            name,
            content_type: self.content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            size: self.size.unwrap_or(0),
            absolute_path,
            download_link,
            owner: owner.map(|key| super::thing("user", key)),
            created_at: now,
            updated_at: now,
        })
    }
}
