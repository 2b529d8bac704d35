use clap::Parser;

use crate::common::types::UserId;

/// Runtime configuration. Identity comes from the deployment (CLI flags or
/// a `.env` file); the backend authenticates on its own and never trusts
/// the id carried here for anything but rendering.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "freight_chat",
    version,
    about = "Realtime offer negotiation client for the freight marketplace"
)]
pub struct AppConfig {
    /// Base URL of the marketplace REST API
    #[arg(
        long,
        env = "FREIGHT_SERVER_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    pub server_url: String,

    /// WebSocket endpoint; derived from the server URL when omitted
    #[arg(long = "ws-url", env = "FREIGHT_WS_URL")]
    pub ws_url_override: Option<String>,

    /// Current user's id
    #[arg(long, env = "FREIGHT_USER_ID")]
    pub user_id: UserId,

    /// Current user's display name
    #[arg(long, env = "FREIGHT_USER_NAME", default_value = "")]
    pub user_name: String,
}

impl AppConfig {
    pub fn ws_url(&self) -> String {
        if let Some(url) = &self.ws_url_override {
            return url.clone();
        }
        let base = self.server_url.trim_end_matches('/');
        let ws = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{ws}/ws")
    }

    pub fn display_name(&self) -> String {
        if self.user_name.is_empty() {
            format!("User {}", self.user_id)
        } else {
            self.user_name.clone()
        }
    }
}
