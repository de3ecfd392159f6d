//! The user collection: staff and customers of the desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use surrealdb::sql::Thing;

use crate::base::types::{DeskError, Res};

/// A user record.
///
/// The password is stored as a hex SHA-256 digest; `phone_number` feeds the
/// WhatsApp comment notifications when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn digest_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password_digest == Self::digest_password(password)
    }
}

/// Client-supplied user fields; the password is digested before storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub password: Option<String>,
}

impl UserPayload {
    pub fn into_fresh(self, now: DateTime<Utc>) -> Res<User> {
        let name = self.name.ok_or_else(|| DeskError::MalformedInput("User name is required.".to_string()))?;
        let email = self.email.ok_or_else(|| DeskError::MalformedInput("User email is required.".to_string()))?;
        let password = self.password.ok_or_else(|| DeskError::MalformedInput("User password is required.".to_string()))?;

        Ok(User {
            id: None,
            name,
            email,
            phone_number: self.phone_number,
            roles: self.roles,
            password_digest: User::digest_password(&password),
            created_at: now,
            updated_at: now,
        })
    }
}

/// API-facing view of a user; the password digest never leaves the store.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Option<Thing>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub roles: Vec<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            roles: user.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_round_trips() {
        let user = User {
            id: None,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: None,
            roles: vec!["root".to_string()],
            password_digest: User::digest_password("hunter2"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(user.verify_password("hunter2"));
        assert!(!user.verify_password("hunter3"));
    }

    #[test]
    fn user_view_omits_the_password_digest() {
        let user = UserPayload {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        }
        .into_fresh(Utc::now())
        .unwrap();

        let json = serde_json::to_string(&UserView::from(user)).unwrap();

        assert!(!json.contains("password"));
        assert!(json.contains("alice@example.com"));
    }
}
