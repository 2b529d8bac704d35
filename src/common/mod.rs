pub mod commands;
pub mod events;
pub mod offer;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use offer::{
    available_actions, price_tone, Applied, Offer, OfferAction, OfferBook, OfferStatus,
    OfferUpdate, PriceTone, Role,
};
pub use types::{
    CargoId, ChatMessage, CompanyId, OfferId, Participant, SessionKey, UserId,
};
