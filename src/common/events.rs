use super::offer::{Offer, OfferAction, OfferStatus, OfferUpdate};
use super::types::{ChatMessage, CompanyId, OfferId, SessionKey};

/// Events the network task sends up to the UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// Socket established and the per-user room joined.
    Connected,
    /// Socket lost; the task keeps reconnecting on its own.
    Disconnected { reason: String },
    /// `new_offer` push: a full snapshot, enough to render a banner and to
    /// seed a chat session without another fetch.
    NewOffer(Offer),
    /// `receive_message` push. Own echoes are filtered by the UI, not here.
    MessageReceived(ChatMessage),
    /// `offer_status_update` push.
    StatusPushed {
        offer_id: OfferId,
        status: OfferStatus,
    },
    /// `offer_updated` push: edited terms for an offer we may know.
    OfferEdited {
        offer_id: OfferId,
        update: OfferUpdate,
    },
    /// History fetch finished for a session.
    HistoryLoaded {
        key: SessionKey,
        messages: Vec<ChatMessage>,
        offer: Box<Offer>,
    },
    HistoryFailed {
        key: SessionKey,
        error: String,
    },
    /// Snapshot refetch finished (`FetchOffer`).
    OfferFetched(Box<Offer>),
    /// A confirmed transition was acknowledged by the backend.
    ActionCompleted {
        offer_id: OfferId,
        status: OfferStatus,
    },
    ActionFailed {
        offer_id: OfferId,
        action: OfferAction,
        error: String,
    },
    /// Re-offer submission acknowledged; the UI performs its full reset.
    OfferSubmitted {
        offer_id: OfferId,
    },
    OfferSubmitFailed {
        offer_id: OfferId,
        error: String,
    },
    CompanyBlocked {
        company_id: CompanyId,
    },
    CompanyBlockFailed {
        company_id: CompanyId,
        error: String,
    },
}
