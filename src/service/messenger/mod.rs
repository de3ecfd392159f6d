pub mod zapmeow;

use std::{ops::Deref, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::instrument;

use crate::base::types::{Res, Void};

// Traits.

/// Generic messaging-gateway trait that clients must implement.
///
/// This trait covers the WhatsApp-style gateway operations: checking whether
/// a phone number is registered, sending text, and sending an image.
#[async_trait]
pub trait GenericMessengerClient: Send + Sync + 'static {
    /// Check whether the number is registered with the gateway, returning its
    /// canonical form when it is.
    async fn check_registered(&self, phone: &str) -> Res<Option<String>>;

    /// Send a plain text message.
    async fn send_text(&self, phone: &str, text: &str) -> Void;

    /// Send an image, supplied as a `data:image/png;base64,` URI.
    async fn send_image(&self, phone: &str, base64_data_uri: &str) -> Void;
}

// Structs.

/// Messenger client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct MessengerClient {
    inner: Arc<dyn GenericMessengerClient>,
}

impl Deref for MessengerClient {
    type Target = dyn GenericMessengerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl MessengerClient {
    pub fn new(inner: Arc<dyn GenericMessengerClient>) -> Self {
        Self { inner }
    }

    /// Deliver a message to one number: verify registration, send any images
    /// read from local disk, then the text. Fails when the number is not
    /// registered; callers trace and swallow per-number failures.
    #[instrument(skip(self, text, image_paths))]
    pub async fn send_message(&self, phone: &str, text: &str, image_paths: &[String]) -> Void {
        let Some(canonical) = self.check_registered(phone).await? else {
            return Err(anyhow!("Phone `{}` is not registered with the gateway.", phone));
        };

        for path in image_paths {
            let bytes = tokio::fs::read(path).await?;
            self.send_image(&canonical, &image_data_uri(&bytes)).await?;
        }

        self.send_text(&canonical, text).await
    }
}

// Helpers.

/// Base64 data URI for an image, the transport format the gateway expects.
pub fn image_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}
