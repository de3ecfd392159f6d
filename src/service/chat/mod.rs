pub mod discord;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Void;

// Types.

/// A binary attachment forwarded along with a chat message.
#[derive(Debug, Clone)]
pub struct OutgoingAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for mirroring ticket activity
/// into a chat platform. Implementing this trait allows different chat
/// services to be used with support-desk.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Post a message to a channel, optionally with a binary attachment.
    ///
    /// Callers treat failures as non-fatal: notification errors are logged
    /// and never propagated to the operation that triggered them.
    async fn send_message(&self, channel_id: &str, text: &str, attachment: Option<OutgoingAttachment>) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
