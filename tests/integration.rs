#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Json, extract::State};
use mockall::mock;
use support_desk::{
    base::{
        config::{Config, ConfigInner},
        types::{AuthState, DeskError, Res, Void},
    },
    collection::{
        comment::CommentPayload,
        record_key,
        ticket::{TicketPayload, TicketPriority, TicketStatus},
        topic::TopicPayload,
        user::User,
    },
    interaction::{comment_event::notify_comment_event, ticket_event::notify_ticket_event},
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient, OutgoingAttachment},
        db::DbClient,
        messenger::{GenericMessengerClient, MessengerClient},
    },
};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn send_message(&self, channel_id: &str, text: &str, attachment: Option<OutgoingAttachment>) -> Void;
    }
}

// Mock messenger client for testing.

mock! {
    pub Messenger {}

    #[async_trait]
    impl GenericMessengerClient for Messenger {
        async fn check_registered(&self, phone: &str) -> Res<Option<String>>;
        async fn send_text(&self, phone: &str, text: &str) -> Void;
        async fn send_image(&self, phone: &str, base64_data_uri: &str) -> Void;
    }
}

// Helpers.

/// Test configuration with an in-memory database endpoint.
fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            db_endpoint: "mem://".to_string(),
            public_url: "https://desk.example.com".to_string(),
            admin_username: "admin@example.com".to_string(),
            admin_password: "hunter2".to_string(),
            ..Default::default()
        }),
    }
}

/// Fresh in-memory database for each test.
async fn test_db() -> DbClient {
    DbClient::surreal_memory().await.expect("Failed to create DB client")
}

async fn create_user(db: &DbClient, name: &str, email: &str, phone: Option<&str>) -> String {
    let now = chrono::Utc::now();
    let user = db
        .create_user(User {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.map(|p| p.to_string()),
            roles: Vec::new(),
            password_digest: User::digest_password("password"),
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("Failed to create user");

    record_key(user.id.as_ref().unwrap())
}

async fn create_topic(db: &DbClient, system: &str, channel: &str) -> String {
    let topic = db
        .insert_topic(
            TopicPayload {
                system: Some(system.to_string()),
                discord_channel_id: Some(channel.to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .expect("Failed to insert topic");

    record_key(topic.id.as_ref().unwrap())
}

fn ticket_payload(topic: &str) -> TicketPayload {
    TicketPayload {
        title: Some("Printer on fire".to_string()),
        topic: Some(topic.to_string()),
        priority: Some(TicketPriority::Day),
        description: Some("It is on fire.".to_string()),
        ..Default::default()
    }
}

fn authed(sub: &str) -> AuthState {
    AuthState {
        authenticated: true,
        sub: Some(sub.to_string()),
        roles: Vec::new(),
    }
}

// Secret keys.

#[tokio::test]
async fn test_secret_key_issuance() {
    let db = test_db().await;
    let topic_id = create_topic(&db, "printers", "C100").await;

    let topic = db.create_topic_secret(&topic_id).await.expect("Failed to create secret");
    let key = topic.secret_key.expect("Secret key missing after issuance");

    // The key is a hex SHA-256 digest.
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    // The key resolves back to its topic.
    let found = db.find_topic_by_secret(&key).await.expect("Lookup failed").expect("Topic not found by key");
    assert_eq!(record_key(found.id.as_ref().unwrap()), topic_id);
}

#[tokio::test]
async fn test_secret_key_is_issued_once() {
    let db = test_db().await;
    let topic_id = create_topic(&db, "printers", "C100").await;

    db.create_topic_secret(&topic_id).await.expect("First issuance failed");

    let second = db.create_topic_secret(&topic_id).await;
    let err = second.expect_err("Second issuance must fail");
    assert_eq!(err.downcast_ref::<DeskError>(), Some(&DeskError::SecretAlreadyExists));
}

#[tokio::test]
async fn test_secret_key_for_missing_topic() {
    let db = test_db().await;

    let err = db.create_topic_secret("no-such-topic").await.expect_err("Issuance must fail");
    assert_eq!(err.downcast_ref::<DeskError>(), Some(&DeskError::ResourceNotFound));
}

// Ticket notifications.

#[tokio::test]
async fn test_new_ticket_sends_exactly_one_message() {
    let config = test_config();
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C200").await;

    let upsert = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    assert!(upsert.created);

    let mut mock = MockChat::new();
    mock.expect_send_message()
        .times(1)
        .withf(|channel_id, text, _| channel_id == "C200" && text.contains("New ticket:") && text.contains("Opened by:** Alice"))
        .returning(|_, _, _| Ok(()));
    let chat = ChatClient::new(Arc::new(mock));

    notify_ticket_event(upsert, authed(&alice), &config, &db, &chat)
        .await
        .expect("Notification failed");
}

#[tokio::test]
async fn test_unauthenticated_upsert_sends_nothing() {
    let config = test_config();
    let db = test_db().await;
    let topic_id = create_topic(&db, "printers", "C200").await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;

    let upsert = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");

    let mut mock = MockChat::new();
    mock.expect_send_message().times(0);
    let chat = ChatClient::new(Arc::new(mock));

    notify_ticket_event(upsert, AuthState::default(), &config, &db, &chat)
        .await
        .expect("Notification should be a silent no-op");
}

#[tokio::test]
async fn test_plain_update_sends_nothing() {
    let config = test_config();
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C200").await;

    let created = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(created.ticket.id.as_ref().unwrap());

    // Status change, no comment reference: no notification.
    let update = TicketPayload {
        id: Some(ticket_id),
        status: Some(TicketStatus::Repairing),
        ..Default::default()
    };
    let upsert = db.upsert_ticket(update, Some(&alice)).await.expect("Failed to update ticket");
    assert!(!upsert.created);
    assert!(!upsert.comment_set);

    let mut mock = MockChat::new();
    mock.expect_send_message().times(0);
    let chat = ChatClient::new(Arc::new(mock));

    notify_ticket_event(upsert, authed(&alice), &config, &db, &chat)
        .await
        .expect("Notification should be a silent no-op");
}

#[tokio::test]
async fn test_comment_reference_update_sends_comment_message() {
    let config = test_config();
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let bob = create_user(&db, "Bob", "bob@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C200").await;

    let created = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(created.ticket.id.as_ref().unwrap());

    let comment = db
        .insert_comment(
            CommentPayload {
                ticket: Some(ticket_id.clone()),
                description: Some("Fuse replaced.".to_string()),
                ..Default::default()
            },
            Some(&bob),
        )
        .await
        .expect("Failed to insert comment");
    let comment_id = record_key(comment.id.as_ref().unwrap());

    let update = TicketPayload {
        id: Some(ticket_id),
        comment: Some(comment_id),
        ..Default::default()
    };
    let upsert = db.upsert_ticket(update, Some(&bob)).await.expect("Failed to update ticket");
    assert!(upsert.comment_set);

    let mut mock = MockChat::new();
    mock.expect_send_message()
        .times(1)
        .withf(|channel_id, text, _| channel_id == "C200" && text.contains("New comment on:") && text.contains("By:** Bob"))
        .returning(|_, _, _| Ok(()));
    let chat = ChatClient::new(Arc::new(mock));

    notify_ticket_event(upsert, authed(&bob), &config, &db, &chat)
        .await
        .expect("Notification failed");
}

#[tokio::test]
async fn test_chat_failure_leaves_the_ticket_stored() {
    let config = test_config();
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C200").await;

    let upsert = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(upsert.ticket.id.as_ref().unwrap());

    let mut mock = MockChat::new();
    mock.expect_send_message().returning(|_, _, _| Err(anyhow::anyhow!("Discord is down.")));
    let chat = ChatClient::new(Arc::new(mock));

    // The notification fails, but the write it trails is untouched.
    let result = notify_ticket_event(upsert, authed(&alice), &config, &db, &chat).await;
    assert!(result.is_err());

    let stored = db.get_ticket(&ticket_id).await.expect("Lookup failed");
    assert!(stored.is_some());
}

// Comment notifications.

#[tokio::test]
async fn test_comment_fans_out_to_distinct_phones() {
    let config = test_config();
    let db = test_db().await;

    // Alice owns the ticket; Bob and Carol comment. Bob shares Alice's number
    // and Dave has none, so exactly two numbers get the fan-out.
    let alice = create_user(&db, "Alice", "alice@example.com", Some("5511999990000")).await;
    let bob = create_user(&db, "Bob", "bob@example.com", Some("5511999990000")).await;
    let carol = create_user(&db, "Carol", "carol@example.com", Some("5511888880000")).await;
    let dave = create_user(&db, "Dave", "dave@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C300").await;

    let created = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(created.ticket.id.as_ref().unwrap());

    for commenter in [&bob, &carol, &dave] {
        db.insert_comment(
            CommentPayload {
                ticket: Some(ticket_id.clone()),
                description: Some("Looking into it.".to_string()),
                ..Default::default()
            },
            Some(commenter),
        )
        .await
        .expect("Failed to insert comment");
    }

    let phones = db.comment_phone_numbers(&ticket_id).await.expect("Aggregation failed");
    assert_eq!(phones, vec!["5511888880000".to_string(), "5511999990000".to_string()]);

    let comment = db
        .insert_comment(
            CommentPayload {
                ticket: Some(ticket_id),
                description: Some("Fixed.".to_string()),
                ..Default::default()
            },
            Some(&carol),
        )
        .await
        .expect("Failed to insert comment");

    let mut mock = MockMessenger::new();
    mock.expect_check_registered().times(2).returning(|phone| Ok(Some(phone.to_string())));
    mock.expect_send_text()
        .times(2)
        .withf(|_, text| text.contains("Comment by *Carol*") && text.contains("*Comment:* Fixed."))
        .returning(|_, _| Ok(()));
    let messenger = MessengerClient::new(Arc::new(mock));

    notify_comment_event(comment, &config, &db, &messenger).await.expect("Fan-out failed");
}

#[tokio::test]
async fn test_unregistered_phone_does_not_stop_the_fan_out() {
    let config = test_config();
    let db = test_db().await;

    let alice = create_user(&db, "Alice", "alice@example.com", Some("5511999990000")).await;
    let bob = create_user(&db, "Bob", "bob@example.com", Some("5511888880000")).await;
    let topic_id = create_topic(&db, "printers", "C300").await;

    let created = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(created.ticket.id.as_ref().unwrap());

    let comment = db
        .insert_comment(
            CommentPayload {
                ticket: Some(ticket_id),
                description: Some("On it.".to_string()),
                ..Default::default()
            },
            Some(&bob),
        )
        .await
        .expect("Failed to insert comment");

    // One of the two numbers is not registered; the other still gets its text.
    let mut mock = MockMessenger::new();
    mock.expect_check_registered().times(2).returning(|phone| {
        if phone == "5511888880000" {
            Ok(None)
        } else {
            Ok(Some(phone.to_string()))
        }
    });
    mock.expect_send_text().times(1).returning(|_, _| Ok(()));
    let messenger = MessengerClient::new(Arc::new(mock));

    notify_comment_event(comment, &config, &db, &messenger).await.expect("Fan-out failed");
}

// Aggregations.

#[tokio::test]
async fn test_ticket_counts_group_by_status_and_topic() {
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let printers = create_topic(&db, "printers", "C400").await;
    let network = create_topic(&db, "network", "C401").await;

    for (topic, status) in [
        (&printers, TicketStatus::Open),
        (&printers, TicketStatus::Open),
        (&printers, TicketStatus::Resolved),
        (&network, TicketStatus::Repairing),
    ] {
        let payload = TicketPayload {
            status: Some(status),
            ..ticket_payload(topic)
        };
        db.upsert_ticket(payload, Some(&alice)).await.expect("Failed to insert ticket");
    }

    let counts = db.ticket_counts().await.expect("Aggregation failed");

    assert_eq!(counts.total_by_status.open, 2);
    assert_eq!(counts.total_by_status.repairing, 1);
    assert_eq!(counts.total_by_status.resolved, 1);

    let printers_total = counts.total_by_topic.iter().find(|row| record_key(&row.topic) == printers).map(|row| row.total);
    let network_total = counts.total_by_topic.iter().find(|row| record_key(&row.topic) == network).map(|row| row.total);
    assert_eq!(printers_total, Some(3));
    assert_eq!(network_total, Some(1));

    // All tickets were just filed, so none are past their window yet.
    assert_eq!(counts.urgent_count, 0);
    assert!(counts.urgent.is_empty());
}

#[tokio::test]
async fn test_broadcast_gateway_pagination() {
    let db = test_db().await;
    let topic_id = create_topic(&db, "printers", "C500").await;
    let other_id = create_topic(&db, "network", "C501").await;

    for n in 0..12 {
        db.insert_broadcast(support_desk::collection::broadcast::BroadcastPayload {
            title: Some(format!("Maintenance window {n}")),
            system: Some(topic_id.clone()),
            message: Some("Scheduled downtime.".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to insert broadcast");
    }
    db.insert_broadcast(support_desk::collection::broadcast::BroadcastPayload {
        title: Some("Other topic".to_string()),
        system: Some(other_id.clone()),
        message: Some("Unrelated.".to_string()),
        ..Default::default()
    })
    .await
    .expect("Failed to insert broadcast");

    let first = db.list_broadcasts(&topic_id, 0).await.expect("Listing failed");
    let second = db.list_broadcasts(&topic_id, 10).await.expect("Listing failed");

    // Pages hold ten broadcasts and never leak other topics.
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 2);
    assert!(first.iter().chain(&second).all(|b| record_key(&b.system) == topic_id));
}

// Sessions.

#[tokio::test]
async fn test_ticket_listing_carries_comments() {
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;
    let topic_id = create_topic(&db, "printers", "C600").await;

    let created = db.upsert_ticket(ticket_payload(&topic_id), Some(&alice)).await.expect("Failed to insert ticket");
    let ticket_id = record_key(created.ticket.id.as_ref().unwrap());

    for text in ["Looking into it.", "Fuse replaced."] {
        db.insert_comment(
            CommentPayload {
                ticket: Some(ticket_id.clone()),
                description: Some(text.to_string()),
                ..Default::default()
            },
            Some(&alice),
        )
        .await
        .expect("Failed to insert comment");
    }

    let runtime = Runtime {
        config: test_config(),
        db: db.clone(),
        chat: ChatClient::new(Arc::new(MockChat::new())),
        messenger: MessengerClient::new(Arc::new(MockMessenger::new())),
    };

    let Json(listing) = support_desk::server::ticket::get_all(State(runtime), authed(&alice)).await.expect("Listing failed");

    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].comments.len(), 2);
    assert_eq!(listing[0].comments[0].description, "Looking into it.");
}

#[tokio::test]
async fn test_session_round_trip() {
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;

    let token = db.create_session(&alice).await.expect("Failed to create session");
    let user = db.session_user(&token).await.expect("Lookup failed").expect("Session did not resolve");

    assert_eq!(user.name, "Alice");
    assert!(db.session_user("bogus-token").await.expect("Lookup failed").is_none());
}

#[tokio::test]
async fn test_concurrent_logins_get_distinct_sessions() {
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;

    // Back-to-back logins land within the same millisecond; both must work.
    let first = db.create_session(&alice).await.expect("First login failed");
    let second = db.create_session(&alice).await.expect("Second login failed");

    assert_ne!(first, second);
    assert!(db.session_user(&first).await.expect("Lookup failed").is_some());
    assert!(db.session_user(&second).await.expect("Lookup failed").is_some());
}

#[tokio::test]
async fn test_deleted_session_no_longer_resolves() {
    let db = test_db().await;
    let alice = create_user(&db, "Alice", "alice@example.com", None).await;

    let token = db.create_session(&alice).await.expect("Failed to create session");
    db.delete_session(&token).await.expect("Failed to delete session");

    assert!(db.session_user(&token).await.expect("Lookup failed").is_none());
}

#[tokio::test]
async fn test_admin_is_seeded_once() {
    let config = test_config();
    let db = DbClient::surreal(&config).await.expect("Failed to create DB client");

    let admin = db
        .find_user_by_email("admin@example.com")
        .await
        .expect("Lookup failed")
        .expect("Admin user missing");

    assert!(admin.roles.contains(&"root".to_string()));
    assert!(admin.verify_password("hunter2"));
}
