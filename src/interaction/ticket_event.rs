//! Ticket-insert notifications mirrored into Discord.
//!
//! Fired after a ticket upsert succeeded. The notification is fire-and-forget
//! relative to the HTTP response: any chat or lookup error is logged and
//! swallowed, never surfaced to the caller of the insert.

use tracing::{Instrument, error, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{AuthState, Void},
    },
    collection::{record_key, ticket::Ticket},
    service::{
        chat::{ChatClient, OutgoingAttachment},
        db::{DbClient, TicketUpsert},
    },
};

/// Handles a ticket upsert event.
///
/// Spawns a task so the originating request never waits on (or fails with)
/// the notification.
#[instrument(skip_all)]
pub fn handle_ticket_event(upsert: TicketUpsert, auth: AuthState, config: Config, db: DbClient, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = notify_ticket_event(upsert, auth, &config, &db, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling ticket event: {}", err);
        }
    });
}

/// Send the Discord notification for a ticket upsert.
///
/// A fresh insert produces exactly one "new ticket" message; an update that
/// newly set the comment reference produces exactly one "new comment"
/// message; anything else is silent. Unauthenticated callers never notify.
#[instrument(skip_all)]
pub async fn notify_ticket_event(upsert: TicketUpsert, auth: AuthState, config: &Config, db: &DbClient, chat: &ChatClient) -> Void {
    if !auth.authenticated {
        return Ok(());
    }

    let ticket = &upsert.ticket;

    // The topic decides which channel the notification lands in.
    let topic_key = record_key(&ticket.topic);
    let topic = db
        .get_topic(&topic_key)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Topic `{}` not found for ticket notification.", topic_key))?;
    let channel_id = &topic.discord_channel_id;

    if upsert.created {
        let opener = match &ticket.owner {
            Some(owner) => db.get_user(&record_key(owner)).await?.map(|user| user.name),
            None => None,
        };

        let attachment = fetch_attachment(ticket, db).await;
        let text = format_new_ticket_message(&config.public_url, ticket, opener.as_deref());

        chat.send_message(channel_id, &text, attachment).await?;
    } else if upsert.comment_set {
        let comment_ref = ticket
            .comment
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Ticket update reported a comment that is not set."))?;
        let comment = db
            .get_comment(&record_key(comment_ref))
            .await?
            .ok_or_else(|| anyhow::anyhow!("Comment `{}` not found for ticket notification.", record_key(comment_ref)))?;

        let commenter = match &comment.owner {
            Some(owner) => db.get_user(&record_key(owner)).await?.map(|user| user.name),
            None => None,
        };

        let text = format_new_comment_message(&config.public_url, ticket, commenter.as_deref(), &comment.description);

        chat.send_message(channel_id, &text, None).await?;
    }

    Ok(())
}

/// Fetch the ticket's attached image over HTTP so it can be forwarded as a
/// binary attachment. A missing or unfetchable attachment downgrades to a
/// plain text notification.
async fn fetch_attachment(ticket: &Ticket, db: &DbClient) -> Option<OutgoingAttachment> {
    let file_ref = match &ticket.attached {
        Some(file_ref) => file_ref,
        None => {
            warn!("Ticket `{}` has no attached image.", ticket.title);
            return None;
        }
    };

    let file = match db.get_file(&record_key(file_ref)).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            warn!("Attached file record `{}` not found.", record_key(file_ref));
            return None;
        }
        Err(err) => {
            warn!("Failed to load attached file record: {}", err);
            return None;
        }
    };

    match download_bytes(&file.download_link).await {
        Ok(bytes) => Some(OutgoingAttachment {
            filename: "attachment.jpeg".to_string(),
            bytes,
        }),
        Err(err) => {
            warn!("Failed to download attachment `{}`: {}", file.download_link, err);
            None
        }
    }
}

async fn download_bytes(url: &str) -> crate::base::types::Res<Vec<u8>> {
    let response = reqwest::get(url).await?.error_for_status()?;

    Ok(response.bytes().await?.to_vec())
}

/// Format the "new ticket" Discord message.
pub fn format_new_ticket_message(public_url: &str, ticket: &Ticket, opener: Option<&str>) -> String {
    let link = ticket_link(public_url, ticket);

    format!(
        "## **New ticket:** [{}]({})\n> ### **Opened by:** {}\n> ### **Priority:** {}\n> **Description:** {}",
        ticket.title,
        link,
        opener.unwrap_or("unknown"),
        ticket.priority.label(),
        ticket.description,
    )
}

/// Format the "new comment" Discord message.
pub fn format_new_comment_message(public_url: &str, ticket: &Ticket, commenter: Option<&str>, description: &str) -> String {
    let link = ticket_link(public_url, ticket);

    format!(
        "## **New comment on:** [{}]({})\n> ### **By:** {}\n> **Comment:** {}",
        ticket.title,
        link,
        commenter.unwrap_or("unknown"),
        description,
    )
}

fn ticket_link(public_url: &str, ticket: &Ticket) -> String {
    let key = ticket.id.as_ref().map(record_key).unwrap_or_default();

    format!("{public_url}/dashboard/ticket-{key}")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::collection::{
        thing,
        ticket::{TicketPayload, TicketPriority},
    };

    use super::*;

    fn sample_ticket() -> Ticket {
        let mut ticket = TicketPayload {
            title: Some("Printer on fire".to_string()),
            topic: Some("printers".to_string()),
            priority: Some(TicketPriority::Day),
            description: Some("It is on fire.".to_string()),
            ..Default::default()
        }
        .into_fresh(Some("alice"), Utc::now())
        .unwrap();
        ticket.id = Some(thing("ticket", "t1"));

        ticket
    }

    #[test]
    fn new_ticket_message_links_the_dashboard() {
        let message = format_new_ticket_message("https://desk.example.com", &sample_ticket(), Some("Alice"));

        assert!(message.contains("[Printer on fire](https://desk.example.com/dashboard/ticket-t1)"));
        assert!(message.contains("**Opened by:** Alice"));
        assert!(message.contains("**Priority:** 24h"));
    }

    #[test]
    fn new_comment_message_names_the_commenter() {
        let message = format_new_comment_message("https://desk.example.com", &sample_ticket(), Some("Bob"), "Fuse replaced.");

        assert!(message.contains("New comment on:"));
        assert!(message.contains("**By:** Bob"));
        assert!(message.contains("**Comment:** Fuse replaced."));
    }

    #[test]
    fn unknown_opener_falls_back() {
        let message = format_new_ticket_message("https://desk.example.com", &sample_ticket(), None);

        assert!(message.contains("**Opened by:** unknown"));
    }
}
