pub mod chat_window;
pub mod notifications;
pub mod offer_card;
pub mod offer_editor;
pub mod sidebar;
