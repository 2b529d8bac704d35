use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = i64;
pub type CargoId = i64;
pub type OfferId = i64;
pub type CompanyId = i64;

/// Key of one chat session: a (cargo, offer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub cargo_id: CargoId,
    pub offer_id: OfferId,
}

impl SessionKey {
    pub fn new(cargo_id: CargoId, offer_id: OfferId) -> Self {
        Self { cargo_id, offer_id }
    }

    /// Broker room shared by both participants of the offer.
    pub fn room(&self) -> String {
        format!("chat_{}_{}", self.cargo_id, self.offer_id)
    }
}

/// Domain model of one chat message. Also the wire shape used by the
/// `send_message` / `receive_message` frames and the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Client-generated idempotency key; frames from older servers may omit
    /// it, in which case a fresh id is assigned on decode.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub cargo_id: CargoId,
    pub offer_id: OfferId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.cargo_id, self.offer_id)
    }
}

/// Display metadata of the user on the other side of a chat window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub name: String,
    pub company: String,
    pub avatar: String,
}
