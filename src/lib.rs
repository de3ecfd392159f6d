//! Library root for `support-desk`.
//!
//! Support-desk is the backend of a support ticketing admin app:
//! - Tickets, comments, topics, broadcasts, and contacts over SurrealDB
//! - Discord notifications for new tickets and ticket comments
//! - WhatsApp mirroring of comments to everyone involved in a ticket
//! - A public broadcast gateway keyed by per-topic secret keys
//!
//! The HTTP surface is served with axum. The architecture is built around
//! extensible traits that allow for different implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod collection;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the support-desk runtime:
/// - Creates the runtime context with database, chat, and messenger clients
/// - Binds the listener and serves the API
pub async fn start(config: Config) -> Void {
    info!("Starting support-desk ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
