//! The contact collection: an address book of external parties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

/// A contact record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied contact fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ContactPayload {
    pub fn into_fresh(self, now: DateTime<Utc>) -> Res<Contact> {
        let name = self.name.ok_or_else(|| DeskError::MalformedInput("Contact name is required.".to_string()))?;
        let organization = self.organization.ok_or_else(|| DeskError::MalformedInput("Contact organization is required.".to_string()))?;

        Ok(Contact {
            id: None,
            name,
            organization,
            phone: self.phone,
            email: self.email,
            created_at: now,
            updated_at: now,
        })
    }
}
