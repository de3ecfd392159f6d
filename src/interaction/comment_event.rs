//! Comment-insert notifications fanned out over the WhatsApp gateway.
//!
//! After a comment is inserted, every interested party (the ticket opener and
//! everyone who commented) with a phone number on file gets the comment text,
//! plus any attached images read from local disk. Per-number failures are
//! traced and swallowed.

use tracing::{Instrument, error, instrument, trace};

use crate::{
    base::{config::Config, types::Void},
    collection::{comment::Comment, record_key, ticket::Ticket},
    service::{db::DbClient, messenger::MessengerClient},
};

/// Handles a comment insert event.
///
/// Spawns a task so the originating request never waits on the fan-out.
#[instrument(skip_all)]
pub fn handle_comment_event(comment: Comment, config: Config, db: DbClient, messenger: MessengerClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = notify_comment_event(comment, &config, &db, &messenger).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling comment event: {}", err);
        }
    });
}

/// Fan the comment out to every registered phone number.
#[instrument(skip_all)]
pub async fn notify_comment_event(comment: Comment, config: &Config, db: &DbClient, messenger: &MessengerClient) -> Void {
    let ticket_key = record_key(&comment.ticket);
    let ticket = db
        .get_ticket(&ticket_key)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Ticket `{}` not found for comment notification.", ticket_key))?;

    let commenter = match &comment.owner {
        Some(owner) => db.get_user(&record_key(owner)).await?.map(|user| user.name),
        None => None,
    };

    let phones = db.comment_phone_numbers(&ticket_key).await?;
    let image_paths = image_paths(&comment, db).await;
    let text = format_comment_broadcast(&config.public_url, &ticket, commenter.as_deref(), &comment.description);

    for phone in phones {
        if let Err(err) = messenger.send_message(&phone, &text, &image_paths).await {
            trace!("Failed to message `{}`: {}", phone, err);
        }
    }

    Ok(())
}

/// Resolve the comment's image refs to local filesystem paths; unresolvable
/// refs are skipped.
async fn image_paths(comment: &Comment, db: &DbClient) -> Vec<String> {
    let mut paths = Vec::new();

    for image in &comment.images {
        match db.get_file(&record_key(image)).await {
            Ok(Some(file)) => paths.push(file.absolute_path),
            Ok(None) => trace!("Comment image record `{}` not found.", record_key(image)),
            Err(err) => trace!("Failed to load comment image record: {}", err),
        }
    }

    paths
}

/// Format the WhatsApp message for a new comment.
pub fn format_comment_broadcast(public_url: &str, ticket: &Ticket, commenter: Option<&str>, description: &str) -> String {
    let key = ticket.id.as_ref().map(record_key).unwrap_or_default();

    format!(
        "Comment by *{}* on ticket *{}* {public_url}/dashboard/ticket-{key} :\n*Comment:* {}",
        commenter.unwrap_or("unknown"),
        ticket.title,
        description,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::collection::{
        thing,
        ticket::{TicketPayload, TicketPriority},
    };

    use super::*;

    #[test]
    fn comment_broadcast_names_commenter_and_links_ticket() {
        let mut ticket = TicketPayload {
            title: Some("VPN down".to_string()),
            topic: Some("network".to_string()),
            priority: Some(TicketPriority::Day),
            description: Some("No tunnel.".to_string()),
            ..Default::default()
        }
        .into_fresh(Some("alice"), Utc::now())
        .unwrap();
        ticket.id = Some(thing("ticket", "t9"));

        let message = format_comment_broadcast("https://desk.example.com", &ticket, Some("Bob"), "Rebooted the gateway.");

        assert!(message.contains("Comment by *Bob*"));
        assert!(message.contains("*VPN down*"));
        assert!(message.contains("https://desk.example.com/dashboard/ticket-t9"));
        assert!(message.contains("*Comment:* Rebooted the gateway."));
    }
}
