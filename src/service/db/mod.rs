use std::{collections::BTreeSet, ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{
    base::types::Res,
    collection::{
        broadcast::{Broadcast, BroadcastPayload},
        comment::{Comment, CommentPayload},
        contact::{Contact, ContactPayload},
        file::{FilePayload, FileRecord},
        ticket::{Ticket, TicketPayload},
        topic::{Topic, TopicPayload},
        user::User,
    },
};

pub mod surreal;

// Aggregation results.

/// Ticket totals per status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub open: u64,
    pub repairing: u64,
    pub resolved: u64,
}

/// Ticket total for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: Thing,
    pub total: u64,
}

/// Result of the ticket-count aggregation: totals per status, totals per
/// topic, and the unresolved tickets that outlived their priority window.
/// Recomputed per request; nothing is cached.
#[derive(Debug, Clone, Serialize)]
pub struct TicketCounts {
    pub total_by_status: StatusCounts,
    pub total_by_topic: Vec<TopicCount>,
    pub urgent: Vec<Ticket>,
    pub urgent_count: usize,
}

/// Outcome of a ticket upsert, carried to the notification handler so it can
/// pick the right message (new ticket vs. new comment).
#[derive(Debug, Clone)]
pub struct TicketUpsert {
    pub ticket: Ticket,
    /// The call created the record rather than updating it.
    pub created: bool,
    /// The update newly set the `comment` reference.
    pub comment_set: bool,
}

// Traits.

/// Generic database client trait that clients must implement.
///
/// This covers the per-collection CRUD surface plus the handful of bespoke
/// queries (phone aggregation, ticket counts, secret-key issuance, broadcast
/// gateway lookups). Implementing this trait allows different database
/// backends to be used with support-desk.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    // Users and sessions.

    /// Insert a user record. The email must be unique.
    async fn create_user(&self, user: User) -> Res<User>;
    /// Look a user up by email.
    async fn find_user_by_email(&self, email: &str) -> Res<Option<User>>;
    /// Look a user up by record key.
    async fn get_user(&self, id: &str) -> Res<Option<User>>;
    async fn list_users(&self) -> Res<Vec<User>>;
    /// Mint an opaque session token for a user.
    async fn create_session(&self, user_id: &str) -> Res<String>;
    /// Resolve a session token back to its user, if the session exists.
    async fn session_user(&self, token: &str) -> Res<Option<User>>;
    /// Discard a session token; resolving it afterwards yields nothing.
    async fn delete_session(&self, token: &str) -> Res<()>;

    // Topics.

    async fn insert_topic(&self, payload: TopicPayload, owner: Option<&str>) -> Res<Topic>;
    async fn get_topic(&self, id: &str) -> Res<Option<Topic>>;
    async fn list_topics(&self) -> Res<Vec<Topic>>;
    async fn remove_topic(&self, id: &str) -> Res<Option<Topic>>;
    /// Issue the topic's secret key. Fails with
    /// [`DeskError::SecretAlreadyExists`](crate::base::types::DeskError) when
    /// a key was issued before, `ResourceNotFound` when the topic is missing.
    async fn create_topic_secret(&self, id: &str) -> Res<Topic>;
    /// Find the topic a broadcast-gateway client key belongs to.
    async fn find_topic_by_secret(&self, key: &str) -> Res<Option<Topic>>;

    // Tickets.

    /// Insert a fresh ticket (no id in the payload) or update an existing one.
    async fn upsert_ticket(&self, payload: TicketPayload, caller: Option<&str>) -> Res<TicketUpsert>;
    async fn get_ticket(&self, id: &str) -> Res<Option<Ticket>>;
    async fn list_tickets(&self) -> Res<Vec<Ticket>>;
    async fn remove_ticket(&self, id: &str) -> Res<Option<Ticket>>;
    /// The grouped ticket-count aggregation backing `/ticket/countAll`.
    async fn ticket_counts(&self) -> Res<TicketCounts>;

    // Comments.

    async fn insert_comment(&self, payload: CommentPayload, owner: Option<&str>) -> Res<Comment>;
    async fn get_comment(&self, id: &str) -> Res<Option<Comment>>;
    async fn comments_for_ticket(&self, ticket_id: &str) -> Res<Vec<Comment>>;
    async fn remove_comment(&self, id: &str) -> Res<Option<Comment>>;
    /// Add (`liked = true`) or remove the user's like on a comment.
    async fn set_comment_like(&self, comment_id: &str, user_id: &str, liked: bool) -> Res<Comment>;
    /// Distinct, non-empty phone numbers of the ticket owner and everyone who
    /// commented on the ticket.
    async fn comment_phone_numbers(&self, ticket_id: &str) -> Res<Vec<String>>;

    // Broadcasts.

    async fn insert_broadcast(&self, payload: BroadcastPayload) -> Res<Broadcast>;
    async fn get_broadcast(&self, id: &str) -> Res<Option<Broadcast>>;
    async fn all_broadcasts(&self) -> Res<Vec<Broadcast>>;
    /// Page (size 10) of a topic's broadcasts, newest first.
    async fn list_broadcasts(&self, topic_id: &str, offset: u64) -> Res<Vec<Broadcast>>;
    async fn remove_broadcast(&self, id: &str) -> Res<Option<Broadcast>>;

    // Contacts.

    async fn insert_contact(&self, payload: ContactPayload) -> Res<Contact>;
    async fn get_contact(&self, id: &str) -> Res<Option<Contact>>;
    async fn list_contacts(&self) -> Res<Vec<Contact>>;
    async fn remove_contact(&self, id: &str) -> Res<Option<Contact>>;

    // Files.

    async fn insert_file(&self, payload: FilePayload, owner: Option<&str>) -> Res<FileRecord>;
    async fn get_file(&self, id: &str) -> Res<Option<FileRecord>>;
}

// Structs.

/// Database client for support-desk.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

// Helpers.

/// Union the candidate phone numbers, dropping empties and duplicates while
/// keeping the result ordered.
pub fn collect_phones<I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let set: BTreeSet<String> = candidates.into_iter().flatten().filter(|phone| !phone.is_empty()).collect();

    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_phones_unions_dedupes_and_filters() {
        let phones = collect_phones(vec![
            Some("5511999990000".to_string()),
            None,
            Some("".to_string()),
            Some("5511999990000".to_string()),
            Some("5511888880000".to_string()),
        ]);

        assert_eq!(phones, vec!["5511888880000".to_string(), "5511999990000".to_string()]);
    }

    #[test]
    fn collect_phones_is_empty_for_no_candidates() {
        assert!(collect_phones(Vec::new()).is_empty());
    }
}
