use serde::{Deserialize, Serialize};

use crate::common::offer::{Offer, OfferStatus, OfferUpdate};
use crate::common::types::{ChatMessage, OfferId};

/// Frames pushed by the broker. The envelope is `{"event": ..., "data": ...}`
/// with snake_case event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A fresh offer against one of the user's cargos, full snapshot.
    NewOffer(Offer),
    /// A chat message for a room this client joined. Includes the sender's
    /// own echo; filtering that out is the UI's job.
    ReceiveMessage(ChatMessage),
    /// Lifecycle change for an offer, pushed to both participants.
    OfferStatusUpdate {
        offer_id: OfferId,
        status: OfferStatus,
    },
    /// Edited terms for a still-open offer.
    OfferUpdated {
        offer_id: OfferId,
        #[serde(flatten)]
        update: OfferUpdate,
    },
}

/// Frames this client publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Subscribe to a per-offer chat room (`chat_{cargo}_{offer}`).
    Join { room: String },
    /// Subscribe to the per-user room, once after connect (`user_{id}`).
    JoinUser { room: String },
    SendMessage(ChatMessage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::SessionKey;

    #[test]
    fn decodes_receive_message_frame() {
        let raw = r#"{
            "event": "receive_message",
            "data": {
                "cargo_id": 3,
                "offer_id": 7,
                "message": "Kedves Partner, holnap indulunk.",
                "from_user_id": 20,
                "to_user_id": 10,
                "created_at": "2025-03-01T09:30:00Z"
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::ReceiveMessage(msg) => {
                assert_eq!(msg.session_key(), SessionKey::new(3, 7));
                assert_eq!(msg.from_user_id, 20);
                assert!(msg.created_at.is_some());
            }
            other => panic!("wrong frame: {other:?}"),
        }
    }

    #[test]
    fn decodes_new_offer_frame_with_sparse_fields() {
        // The push omits status and seen; both must default.
        let raw = r#"{
            "event": "new_offer",
            "data": {
                "offer_id": 41,
                "cargo_id": 12,
                "from_user_id": 20,
                "to_user_id": 10,
                "from_user": "Kovacs Adam",
                "user_company": "Trans Kft",
                "price": 850.5,
                "currency": "eur",
                "origin": "Graz",
                "destination": "Debrecen",
                "pickup_date": "2025-04-10",
                "arrival_date": "2025-04-11"
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::NewOffer(offer) => {
                assert_eq!(offer.status, OfferStatus::Pending);
                assert!(!offer.seen);
                assert_eq!(offer.price_line(), "850.5 EUR");
            }
            other => panic!("wrong frame: {other:?}"),
        }
    }

    #[test]
    fn decodes_status_update_frame() {
        let raw = r#"{"event":"offer_status_update","data":{"offer_id":41,"status":"accepted"}}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::OfferStatusUpdate { offer_id, status } => {
                assert_eq!(offer_id, 41);
                assert_eq!(status, OfferStatus::Accepted);
            }
            other => panic!("wrong frame: {other:?}"),
        }
    }

    #[test]
    fn decodes_offer_updated_frame() {
        let raw = r#"{
            "event": "offer_updated",
            "data": {
                "offer_id": 41,
                "pickup_date": "2025-04-12",
                "arrival_date": "2025-04-13",
                "price": 900.0,
                "currency": "eur",
                "note": "raised after decline"
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::OfferUpdated { offer_id, update } => {
                assert_eq!(offer_id, 41);
                assert_eq!(update.price, 900.0);
                assert_eq!(update.note, "raised after decline");
            }
            other => panic!("wrong frame: {other:?}"),
        }
    }

    #[test]
    fn encodes_join_frame_envelope() {
        let frame = ClientFrame::Join {
            room: SessionKey::new(3, 7).room(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "join");
        assert_eq!(json["data"]["room"], "chat_3_7");
    }
}
