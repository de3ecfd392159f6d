//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default address the HTTP API binds to.
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Default public URL used when formatting dashboard links.
fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

/// Default Discord REST API base URL.
fn default_discord_api_url() -> String {
    "https://discord.com/api/v10".to_string()
}

/// Default path for persisted file storage.
fn default_storage_path() -> String {
    "/var/lib/support-desk/storage".to_string()
}

/// Default path for temporary upload storage.
fn default_storage_temp_path() -> String {
    "/var/lib/support-desk/tmp".to_string()
}

/// Configuration for the support-desk application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Configuration values for the support-desk application.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `ws://localhost:8000` or `mem://`.
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`).
    #[serde(default)]
    pub db_username: String,
    /// Database password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: String,
    /// Address the HTTP API listens on (`BIND_ADDR`).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Public base URL of the dashboard, used in notification links (`PUBLIC_URL`).
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Default admin username, seeded at startup (`ADMIN_USERNAME`).
    pub admin_username: String,
    /// Default admin password (`ADMIN_PASSWORD`).
    pub admin_password: String,
    /// Persistent file storage path (`STORAGE_PATH`).
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Temporary file storage path (`STORAGE_TEMP_PATH`).
    #[serde(default = "default_storage_temp_path")]
    pub storage_temp_path: String,
    /// Discord REST API base URL (`DISCORD_API_URL`).
    #[serde(default = "default_discord_api_url")]
    pub discord_api_url: String,
    /// Discord bot token (`DISCORD_BOT_TOKEN`).
    pub discord_bot_token: String,
    /// WhatsApp gateway registration-check endpoint (`ZAPMEOW_CHECK_USER_URL`).
    pub zapmeow_check_user_url: String,
    /// WhatsApp gateway send-text endpoint (`ZAPMEOW_SEND_TEXT_URL`).
    pub zapmeow_send_text_url: String,
    /// WhatsApp gateway send-image endpoint (`ZAPMEOW_SEND_IMAGE_URL`).
    pub zapmeow_send_image_url: String,
}

impl Config {
    /// Load configuration from the environment and an optional config file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SUPPORT_DESK"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("Bind address `{}` is not a valid socket address.", result.bind_addr));
        }

        if result.public_url.ends_with('/') {
            return Err(anyhow::anyhow!("Public URL must not end with a trailing slash."));
        }

        Ok(result)
    }
}
