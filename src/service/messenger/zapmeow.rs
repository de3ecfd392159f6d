//! Zapmeow WhatsApp gateway implementation of the messenger service.
//!
//! The gateway is three plain HTTP/JSON endpoints: registration check,
//! send-text, and send-image.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{GenericMessengerClient, MessengerClient};

// Extra methods on `MessengerClient` applied by the zapmeow implementation.

impl MessengerClient {
    /// Creates a new zapmeow messenger client.
    pub fn zapmeow(config: &Config) -> Self {
        let client = ZapmeowMessengerClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct CheckPhonesRequest {
    phones: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CheckPhonesResponse {
    phones: Vec<CheckedPhone>,
}

#[derive(Debug, Deserialize)]
struct CheckedPhone {
    phone: String,
    is_registered: bool,
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    phone: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SendImageRequest<'a> {
    phone: &'a str,
    base64: &'a str,
}

// Structs.

/// Zapmeow gateway client implementation.
#[derive(Clone)]
pub struct ZapmeowMessengerClient {
    http: reqwest::Client,
    check_user_url: String,
    send_text_url: String,
    send_image_url: String,
}

impl ZapmeowMessengerClient {
    /// Create a new zapmeow messenger client.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            check_user_url: config.zapmeow_check_user_url.clone(),
            send_text_url: config.zapmeow_send_text_url.clone(),
            send_image_url: config.zapmeow_send_image_url.clone(),
        }
    }
}

#[async_trait]
impl GenericMessengerClient for ZapmeowMessengerClient {
    #[instrument(skip(self))]
    async fn check_registered(&self, phone: &str) -> Res<Option<String>> {
        let request = CheckPhonesRequest {
            phones: vec![phone.to_string()],
        };

        let response: CheckPhonesResponse = self
            .http
            .post(&self.check_user_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Gateway registration check failed: {}", e))?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.phones.into_iter().find(|p| p.is_registered).map(|p| p.phone))
    }

    #[instrument(skip(self, text))]
    async fn send_text(&self, phone: &str, text: &str) -> Void {
        self.http
            .post(&self.send_text_url)
            .json(&SendTextRequest { phone, text })
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send text: {}", e))?
            .error_for_status()?;

        Ok(())
    }

    #[instrument(skip(self, base64_data_uri))]
    async fn send_image(&self, phone: &str, base64_data_uri: &str) -> Void {
        self.http
            .post(&self.send_image_url)
            .json(&SendImageRequest {
                phone,
                base64: base64_data_uri,
            })
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send image: {}", e))?
            .error_for_status()?;

        Ok(())
    }
}
