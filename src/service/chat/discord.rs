//! Discord REST implementation of the chat service.
//!
//! Messages are posted with the bot token via `POST /channels/{id}/messages`.
//! Attachments use the multipart form Discord expects: a `payload_json` part
//! describing the message plus a `files[0]` part carrying the bytes.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
};
use serde_json::json;
use tracing::instrument;

use crate::base::{config::Config, types::Void};

use super::{ChatClient, GenericChatClient, OutgoingAttachment};

// Extra methods on `ChatClient` applied by the discord implementation.

impl ChatClient {
    /// Creates a new Discord chat client.
    pub fn discord(config: &Config) -> Self {
        let client = DiscordChatClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Discord client implementation.
#[derive(Clone)]
pub struct DiscordChatClient {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl DiscordChatClient {
    /// Create a new Discord chat client.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.discord_api_url.clone(),
            bot_token: config.discord_bot_token.clone(),
        }
    }
}

#[async_trait]
impl GenericChatClient for DiscordChatClient {
    #[instrument(skip(self, text, attachment))]
    async fn send_message(&self, channel_id: &str, text: &str, attachment: Option<OutgoingAttachment>) -> Void {
        let url = format!("{}/channels/{}/messages", self.api_url, channel_id);
        let request = self.http.post(&url).header(AUTHORIZATION, format!("Bot {}", self.bot_token));

        let request = match attachment {
            None => request.json(&json!({ "content": text })),
            Some(attachment) => {
                let payload = json!({
                    "content": text,
                    "attachments": [{ "id": 0, "filename": attachment.filename }],
                });
                let form = Form::new()
                    .text("payload_json", payload.to_string())
                    .part("files[0]", Part::bytes(attachment.bytes).file_name(attachment.filename));

                request.multipart(form)
            }
        };

        let response = request.send().await.map_err(|e| anyhow!("Failed to send message: {}", e))?;

        response.error_for_status().map_err(|e| anyhow!("Discord rejected the message: {}", e))?;

        Ok(())
    }
}
