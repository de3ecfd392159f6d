//! The runtime for the support desk.

use tokio::net::TcpListener;
use tracing::info;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{chat::ChatClient, db::DbClient, messenger::MessengerClient},
};

/// The runtime: the configuration plus every service client the handlers
/// need. This is trivially cloneable and doubles as the HTTP router state.
#[derive(Clone)]
pub struct Runtime {
    pub config: Config,
    pub db: DbClient,
    pub chat: ChatClient,
    pub messenger: MessengerClient,
}

impl Runtime {
    /// Build the runtime from the configuration, connecting every service.
    pub async fn new(config: Config) -> Res<Self> {
        let db = DbClient::surreal(&config).await?;
        let chat = ChatClient::discord(&config);
        let messenger = MessengerClient::zapmeow(&config);

        Ok(Self { config, db, chat, messenger })
    }

    /// Bind the listener and serve the API until ctrl-c.
    pub async fn start(self) -> Void {
        let addr = self.config.bind_addr.clone();
        let router = server::router(self);

        info!("Listening on {} ...", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
