//! SurrealDB implementation for support-desk data storage.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
    sql::Thing,
};
use tracing::{info, instrument};

use crate::{
    base::{config::Config, keys, types::{DeskError, Res}},
    collection::{
        broadcast::{Broadcast, BroadcastPayload},
        comment::{Comment, CommentPayload},
        contact::{Contact, ContactPayload},
        file::{FilePayload, FileRecord},
        record_key, thing,
        ticket::{Ticket, TicketPayload, TicketStatus},
        topic::{Topic, TopicPayload},
        user::User,
    },
};

use super::{DbClient, GenericDbClient, StatusCounts, TicketCounts, TicketUpsert, TopicCount, collect_phones};

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connect to the configured SurrealDB endpoint and seed the default
    /// admin user.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::connect(&config.db_endpoint, &config.db_username, &config.db_password).await?;

        client.seed_admin(&config.admin_username, &config.admin_password).await?;

        Ok(Self { inner: Arc::new(client) })
    }

    /// In-memory database instance, used by the test suite.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::connect("mem://", "", "").await?;

        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

/// A login session record; the record key is the opaque bearer token.
#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user: Thing,
    created_at: DateTime<Utc>,
}

/// One row of the per-status ticket count aggregation.
#[derive(Debug, Deserialize)]
struct StatusRow {
    status: TicketStatus,
    total: u64,
}

impl SurrealDbClient {
    /// Connect and prepare the schema.
    #[instrument(name = "SurrealDbClient::connect", skip_all)]
    pub async fn connect(endpoint: &str, username: &str, password: &str) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        // The embedded engine has no root credentials.
        if !endpoint.starts_with("mem") {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns("support").use_db("desk").await?;

        db.query("DEFINE INDEX user_email ON user FIELDS email UNIQUE").await?;

        info!("Database initialized successfully.");

        Ok(Self { db })
    }

    /// Create the default admin user if it does not exist yet.
    #[instrument(skip_all)]
    pub async fn seed_admin(&self, username: &str, password: &str) -> Res<()> {
        if self.find_user_by_email(username).await?.is_some() {
            return Ok(());
        }

        info!("Seeding default admin user `{}`.", username);

        let now = Utc::now();
        self.create_user(User {
            id: None,
            name: username.to_string(),
            email: username.to_string(),
            phone_number: None,
            roles: vec!["root".to_string()],
            password_digest: User::digest_password(password),
            created_at: now,
            updated_at: now,
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    // Users and sessions.

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: User) -> Res<User> {
        let created: Option<User> = self.db.create("user").content(user).await?;

        created.ok_or_else(|| anyhow!("Failed to insert user."))
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Res<Option<User>> {
        let mut response = self
            .db
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = response.take(0)?;

        Ok(users.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: &str) -> Res<Option<User>> {
        Ok(self.db.select(("user", id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Res<Vec<User>> {
        Ok(self.db.select("user").await?)
    }

    #[instrument(skip(self))]
    async fn create_session(&self, user_id: &str) -> Res<String> {
        let token = keys::generate_session_token(user_id);
        let session = Session {
            user: thing("user", user_id),
            created_at: Utc::now(),
        };

        let created: Option<Session> = self.db.create(("session", token.as_str())).content(session).await?;
        created.ok_or_else(|| anyhow!("Failed to create session."))?;

        Ok(token)
    }

    #[instrument(skip(self, token))]
    async fn session_user(&self, token: &str) -> Res<Option<User>> {
        let session: Option<Session> = self.db.select(("session", token)).await?;

        match session {
            Some(session) => self.get_user(&record_key(&session.user)).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self, token))]
    async fn delete_session(&self, token: &str) -> Res<()> {
        let _: Option<Session> = self.db.delete(("session", token)).await?;

        Ok(())
    }

    // Topics.

    #[instrument(skip(self, payload))]
    async fn insert_topic(&self, payload: TopicPayload, owner: Option<&str>) -> Res<Topic> {
        let topic = payload.into_fresh(owner, Utc::now())?;
        let created: Option<Topic> = self.db.create("topic").content(topic).await?;

        created.ok_or_else(|| anyhow!("Failed to insert topic."))
    }

    #[instrument(skip(self))]
    async fn get_topic(&self, id: &str) -> Res<Option<Topic>> {
        Ok(self.db.select(("topic", id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_topics(&self) -> Res<Vec<Topic>> {
        Ok(self.db.select("topic").await?)
    }

    #[instrument(skip(self))]
    async fn remove_topic(&self, id: &str) -> Res<Option<Topic>> {
        Ok(self.db.delete(("topic", id)).await?)
    }

    #[instrument(skip(self))]
    async fn create_topic_secret(&self, id: &str) -> Res<Topic> {
        let topic: Topic = self.db.select(("topic", id)).await?.ok_or(DeskError::ResourceNotFound)?;

        if topic.secret_key.is_some() {
            return Err(DeskError::SecretAlreadyExists.into());
        }

        let updated = Topic {
            secret_key: Some(keys::generate_secret_key(id)),
            updated_at: Utc::now(),
            ..topic
        };

        let topic: Option<Topic> = self.db.update(("topic", id)).content(updated).await?;

        topic.ok_or(DeskError::ResourceNotFound.into())
    }

    #[instrument(skip_all)]
    async fn find_topic_by_secret(&self, key: &str) -> Res<Option<Topic>> {
        let mut response = self
            .db
            .query("SELECT * FROM topic WHERE secret_key = $key LIMIT 1")
            .bind(("key", key.to_string()))
            .await?;
        let topics: Vec<Topic> = response.take(0)?;

        Ok(topics.into_iter().next())
    }

    // Tickets.

    #[instrument(skip(self, payload))]
    async fn upsert_ticket(&self, payload: TicketPayload, caller: Option<&str>) -> Res<TicketUpsert> {
        let now = Utc::now();

        match payload.id.clone() {
            None => {
                let ticket = payload.into_fresh(caller, now)?;
                let created: Option<Ticket> = self.db.create("ticket").content(ticket).await?;
                let ticket = created.ok_or_else(|| anyhow!("Failed to insert ticket."))?;

                Ok(TicketUpsert {
                    ticket,
                    created: true,
                    comment_set: false,
                })
            }
            Some(id) => {
                let existing: Ticket = self.db.select(("ticket", id.as_str())).await?.ok_or(DeskError::ResourceNotFound)?;

                let new_comment = payload.comment.as_deref().map(|key| thing("comment", key));
                let comment_set = new_comment.is_some() && new_comment != existing.comment;

                let updated = payload.apply_to(existing, caller, now);
                let ticket: Option<Ticket> = self.db.update(("ticket", id.as_str())).content(updated).await?;
                let ticket = ticket.ok_or(DeskError::ResourceNotFound)?;

                Ok(TicketUpsert {
                    ticket,
                    created: false,
                    comment_set,
                })
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, id: &str) -> Res<Option<Ticket>> {
        Ok(self.db.select(("ticket", id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_tickets(&self) -> Res<Vec<Ticket>> {
        Ok(self.db.select("ticket").await?)
    }

    #[instrument(skip(self))]
    async fn remove_ticket(&self, id: &str) -> Res<Option<Ticket>> {
        Ok(self.db.delete(("ticket", id)).await?)
    }

    #[instrument(skip(self))]
    async fn ticket_counts(&self) -> Res<TicketCounts> {
        let mut response = self
            .db
            .query("SELECT status, count() AS total FROM ticket GROUP BY status")
            .query("SELECT topic, count() AS total FROM ticket GROUP BY topic")
            .query("SELECT * FROM ticket WHERE status != 'Resolved'")
            .await?;

        let status_rows: Vec<StatusRow> = response.take(0)?;
        let total_by_topic: Vec<TopicCount> = response.take(1)?;
        let unresolved: Vec<Ticket> = response.take(2)?;

        let mut total_by_status = StatusCounts::default();
        for row in status_rows {
            match row.status {
                TicketStatus::Open => total_by_status.open = row.total,
                TicketStatus::Repairing => total_by_status.repairing = row.total,
                TicketStatus::Resolved => total_by_status.resolved = row.total,
            }
        }

        let now = Utc::now();
        let urgent: Vec<Ticket> = unresolved.into_iter().filter(|ticket| ticket.is_urgent(now)).collect();
        let urgent_count = urgent.len();

        Ok(TicketCounts {
            total_by_status,
            total_by_topic,
            urgent,
            urgent_count,
        })
    }

    // Comments.

    #[instrument(skip(self, payload))]
    async fn insert_comment(&self, payload: CommentPayload, owner: Option<&str>) -> Res<Comment> {
        let comment = payload.into_fresh(owner, Utc::now())?;

        // The referenced ticket must exist.
        let ticket: Option<Ticket> = self.db.select(("ticket", record_key(&comment.ticket).as_str())).await?;
        ticket.ok_or(DeskError::ResourceNotFound)?;

        let created: Option<Comment> = self.db.create("comment").content(comment).await?;

        created.ok_or_else(|| anyhow!("Failed to insert comment."))
    }

    #[instrument(skip(self))]
    async fn get_comment(&self, id: &str) -> Res<Option<Comment>> {
        Ok(self.db.select(("comment", id)).await?)
    }

    #[instrument(skip(self))]
    async fn comments_for_ticket(&self, ticket_id: &str) -> Res<Vec<Comment>> {
        let mut response = self
            .db
            .query("SELECT * FROM comment WHERE ticket = $ticket ORDER BY created_at ASC")
            .bind(("ticket", thing("ticket", ticket_id)))
            .await?;

        Ok(response.take(0)?)
    }

    #[instrument(skip(self))]
    async fn remove_comment(&self, id: &str) -> Res<Option<Comment>> {
        Ok(self.db.delete(("comment", id)).await?)
    }

    #[instrument(skip(self))]
    async fn set_comment_like(&self, comment_id: &str, user_id: &str, liked: bool) -> Res<Comment> {
        let comment: Comment = self.db.select(("comment", comment_id)).await?.ok_or(DeskError::ResourceNotFound)?;

        let user = thing("user", user_id);
        let mut liked_by = comment.liked_by.clone();
        if liked {
            if !liked_by.contains(&user) {
                liked_by.push(user);
            }
        } else {
            liked_by.retain(|liker| liker != &user);
        }

        let updated = Comment {
            liked_by,
            updated_at: Utc::now(),
            ..comment
        };

        let comment: Option<Comment> = self.db.update(("comment", comment_id)).content(updated).await?;

        comment.ok_or(DeskError::ResourceNotFound.into())
    }

    #[instrument(skip(self))]
    async fn comment_phone_numbers(&self, ticket_id: &str) -> Res<Vec<String>> {
        let mut response = self
            .db
            .query("SELECT VALUE owner.phone_number FROM comment WHERE ticket = $ticket")
            .query("SELECT VALUE owner.phone_number FROM ticket WHERE id = $ticket")
            .bind(("ticket", thing("ticket", ticket_id)))
            .await?;

        let commenter_phones: Vec<Option<String>> = response.take(0)?;
        let owner_phone: Vec<Option<String>> = response.take(1)?;

        Ok(collect_phones(commenter_phones.into_iter().chain(owner_phone)))
    }

    // Broadcasts.

    #[instrument(skip(self, payload))]
    async fn insert_broadcast(&self, payload: BroadcastPayload) -> Res<Broadcast> {
        let broadcast = payload.into_fresh(Utc::now())?;
        let created: Option<Broadcast> = self.db.create("broadcast").content(broadcast).await?;

        created.ok_or_else(|| anyhow!("Failed to insert broadcast."))
    }

    #[instrument(skip(self))]
    async fn get_broadcast(&self, id: &str) -> Res<Option<Broadcast>> {
        Ok(self.db.select(("broadcast", id)).await?)
    }

    #[instrument(skip(self))]
    async fn all_broadcasts(&self) -> Res<Vec<Broadcast>> {
        Ok(self.db.select("broadcast").await?)
    }

    #[instrument(skip(self))]
    async fn list_broadcasts(&self, topic_id: &str, offset: u64) -> Res<Vec<Broadcast>> {
        let mut response = self
            .db
            .query("SELECT * FROM broadcast WHERE system = $topic ORDER BY created_at DESC LIMIT 10 START $offset")
            .bind(("topic", thing("topic", topic_id)))
            .bind(("offset", offset))
            .await?;

        Ok(response.take(0)?)
    }

    #[instrument(skip(self))]
    async fn remove_broadcast(&self, id: &str) -> Res<Option<Broadcast>> {
        Ok(self.db.delete(("broadcast", id)).await?)
    }

    // Contacts.

    #[instrument(skip(self, payload))]
    async fn insert_contact(&self, payload: ContactPayload) -> Res<Contact> {
        let contact = payload.into_fresh(Utc::now())?;
        let created: Option<Contact> = self.db.create("contact").content(contact).await?;

        created.ok_or_else(|| anyhow!("Failed to insert contact."))
    }

    #[instrument(skip(self))]
    async fn get_contact(&self, id: &str) -> Res<Option<Contact>> {
        Ok(self.db.select(("contact", id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_contacts(&self) -> Res<Vec<Contact>> {
        Ok(self.db.select("contact").await?)
    }

    #[instrument(skip(self))]
    async fn remove_contact(&self, id: &str) -> Res<Option<Contact>> {
        Ok(self.db.delete(("contact", id)).await?)
    }

    // Files.

    #[instrument(skip(self, payload))]
    async fn insert_file(&self, payload: FilePayload, owner: Option<&str>) -> Res<FileRecord> {
        let file = payload.into_fresh(owner, Utc::now())?;
        let created: Option<FileRecord> = self.db.create("file").content(file).await?;

        created.ok_or_else(|| anyhow!("Failed to insert file."))
    }

    #[instrument(skip(self))]
    async fn get_file(&self, id: &str) -> Res<Option<FileRecord>> {
        Ok(self.db.select(("file", id)).await?)
    }
}
