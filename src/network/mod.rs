pub mod client;
pub mod protocol;
pub mod rest;

pub use client::MarketClient;
pub use rest::RestClient;

use thiserror::Error;

/// Failures inside the network task. None of them is fatal to the app: REST
/// failures become events, socket failures trigger a reconnect.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("websocket: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("connection closed by server")]
    ConnectionClosed,
}
