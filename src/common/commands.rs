use super::offer::{OfferAction, OfferUpdate};
use super::types::{ChatMessage, CompanyId, OfferId, SessionKey};

/// Commands the UI sends down to the network task.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Subscribe to the per-offer chat room.
    JoinRoom(SessionKey),
    /// Publish a chat message. The UI has already appended it locally.
    SendMessage(ChatMessage),
    /// Fetch message history plus the offer snapshot for a session.
    FetchHistory(SessionKey),
    /// Run one confirmed offer transition (accept/decline/finalize/withdraw).
    OfferAction {
        offer_id: OfferId,
        action: OfferAction,
    },
    /// Submit edited terms from the re-offer editor.
    SubmitOffer {
        offer_id: OfferId,
        update: OfferUpdate,
    },
    /// Refetch one offer snapshot after a full reset.
    FetchOffer(OfferId),
    /// Clear the "new offer" badge server-side.
    MarkSeen(OfferId),
    /// Put the partner's company on the blocklist.
    BlockCompany(CompanyId),
}
