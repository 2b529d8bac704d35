use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Utc;
use uuid::Uuid;

use crate::common::offer::{Offer, OfferBook};
use crate::common::types::{ChatMessage, CompanyId, Participant, SessionKey, UserId};

/// Opening a window past this evicts the oldest one (FIFO, not LRU).
pub const MAX_OPEN_SESSIONS: usize = 3;
pub const BANNER_TTL: Duration = Duration::from_secs(10);
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// One rendered chat line. Ownership is decided once, at append time.
#[derive(Debug, Clone)]
pub struct SessionMessage {
    pub text: String,
    pub own: bool,
}

/// One open chat window, scoped to a (cargo, offer) pair.
pub struct ChatSession {
    pub key: SessionKey,
    pub partner: Participant,
    pub messages: Vec<SessionMessage>,
    pub input_text: String,
    pub history_loaded: bool,
    /// Message ids already rendered; the idempotency guard against the
    /// broker re-delivering or racing the optimistic local append.
    applied_ids: HashSet<Uuid>,
}

impl ChatSession {
    fn new(key: SessionKey, partner: Participant) -> Self {
        Self {
            key,
            partner,
            messages: Vec::new(),
            input_text: String::new(),
            history_loaded: false,
            applied_ids: HashSet::new(),
        }
    }

    /// Append unless the id was already applied. Returns whether it landed.
    fn append(&mut self, id: Uuid, text: String, own: bool) -> bool {
        if !self.applied_ids.insert(id) {
            return false;
        }
        self.messages.push(SessionMessage { text, own });
        true
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A session for the key already exists; nothing changed.
    AlreadyOpen,
    /// A fresh session was created (and possibly the oldest evicted).
    Opened { evicted: Option<SessionKey> },
}

/// Where an incoming `receive_message` ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// Own echo or an already-applied id; dropped by design.
    Deduplicated,
    Appended(SessionKey),
    /// No window open for the key; the caller raises a banner instead.
    NoSession,
}

/// Time-limited offer banner. Clicking it opens the carried offer's chat.
pub struct Banner {
    pub offer: Offer,
    created: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTone {
    Positive,
    Negative,
}

pub struct Toast {
    pub text: String,
    pub tone: ToastTone,
    created: Instant,
}

/// All mutable view state, owned by the UI thread. Sessions are kept in
/// open order: index 0 is the oldest and the first to be evicted; stacked
/// window positions are recomputed from the index every frame, so layout
/// self-corrects after every open and close.
pub struct AppState {
    pub me: UserId,
    pub user_name: String,
    pub offers: OfferBook,
    sessions: Vec<ChatSession>,
    pub banners: Vec<Banner>,
    pub toasts: Vec<Toast>,
    pub connected: bool,
    pub blocked_companies: HashSet<CompanyId>,
}

impl AppState {
    pub fn new(me: UserId, user_name: String) -> Self {
        Self {
            me,
            user_name,
            offers: OfferBook::default(),
            sessions: Vec::new(),
            banners: Vec::new(),
            toasts: Vec::new(),
            connected: false,
            blocked_companies: HashSet::new(),
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session_mut(&mut self, key: SessionKey) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.key == key)
    }

    /// Open a chat window for `offer`. Idempotent per key; at capacity the
    /// oldest session is evicted first.
    pub fn open_session(&mut self, offer: &Offer) -> OpenOutcome {
        let key = SessionKey::new(offer.cargo_id, offer.offer_id);
        if self.sessions.iter().any(|s| s.key == key) {
            return OpenOutcome::AlreadyOpen;
        }

        let evicted = if self.sessions.len() >= MAX_OPEN_SESSIONS {
            Some(self.sessions.remove(0).key)
        } else {
            None
        };

        self.sessions
            .push(ChatSession::new(key, offer.partner_view(self.me)));
        OpenOutcome::Opened { evicted }
    }

    pub fn close_session(&mut self, key: SessionKey) {
        self.sessions.retain(|s| s.key != key);
    }

    /// Validate and stage an outgoing message: empty or whitespace-only
    /// drafts produce nothing, otherwise the message is appended locally as
    /// "own" and returned for publishing. No delivery confirmation exists.
    pub fn send_message(&mut self, key: SessionKey) -> Option<ChatMessage> {
        let me = self.me;
        let session = self.session_mut(key)?;
        let text = session.input_text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            cargo_id: key.cargo_id,
            offer_id: key.offer_id,
            from_user_id: me,
            to_user_id: session.partner.user_id,
            message: text.clone(),
            created_at: Some(Utc::now()),
        };
        session.append(message.id, text, true);
        session.input_text.clear();
        Some(message)
    }

    /// Apply a `receive_message` push. Own echoes are dropped (already
    /// rendered optimistically), as is any id applied before.
    pub fn receive_message(&mut self, message: &ChatMessage) -> Inbound {
        if message.from_user_id == self.me {
            return Inbound::Deduplicated;
        }
        let key = message.session_key();
        let Some(session) = self.session_mut(key) else {
            return Inbound::NoSession;
        };
        if session.append(message.id, message.message.clone(), false) {
            Inbound::Appended(key)
        } else {
            Inbound::Deduplicated
        }
    }

    /// Append fetched history in server order. Ids are recorded, so a
    /// message that raced in over the socket is not duplicated.
    pub fn apply_history(&mut self, key: SessionKey, messages: &[ChatMessage]) {
        let me = self.me;
        let Some(session) = self.session_mut(key) else {
            return;
        };
        for m in messages {
            session.append(m.id, m.message.clone(), m.from_user_id == me);
        }
        session.history_loaded = true;
    }

    pub fn notify(&mut self, offer: Offer, now: Instant) {
        self.offers.upsert(offer.clone());
        self.banners.push(Banner {
            offer,
            created: now,
        });
    }

    /// Dismiss banner `index` and hand back its offer for opening a chat.
    pub fn take_banner(&mut self, index: usize) -> Option<Offer> {
        if index < self.banners.len() {
            Some(self.banners.remove(index).offer)
        } else {
            None
        }
    }

    pub fn toast(&mut self, text: impl Into<String>, tone: ToastTone, now: Instant) {
        self.toasts.push(Toast {
            text: text.into(),
            tone,
            created: now,
        });
    }

    /// Drop banners and toasts past their lifetime. Safe against entries
    /// already removed by clicks; there are no timers to cancel.
    pub fn prune_expired(&mut self, now: Instant) {
        self.banners
            .retain(|b| now.duration_since(b.created) < BANNER_TTL);
        self.toasts
            .retain(|t| now.duration_since(t.created) < TOAST_TTL);
    }

    /// Full reset after a re-offer submission. The offer book survives and
    /// is re-seeded by the follow-up fetch; windows and banners do not.
    pub fn reset_transient(&mut self) {
        self.sessions.clear();
        self.banners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::offer::OfferStatus;

    const ME: UserId = 10;

    fn offer(cargo_id: i64, offer_id: i64) -> Offer {
        Offer {
            offer_id,
            cargo_id,
            from_user_id: 20,
            to_user_id: ME,
            from_user: "Kovacs Adam".into(),
            to_user: "Owner".into(),
            user_company: "Trans Kft".into(),
            company_id: Some(4),
            profile_picture: String::new(),
            price: 950.0,
            currency: "eur".into(),
            note: String::new(),
            origin: "Wien".into(),
            destination: "Budapest".into(),
            pickup_date: "2025-03-01".into(),
            arrival_date: "2025-03-02".into(),
            status: OfferStatus::Pending,
            seen: false,
        }
    }

    fn incoming(cargo_id: i64, offer_id: i64, from: UserId, text: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            cargo_id,
            offer_id,
            from_user_id: from,
            to_user_id: ME,
            message: text.into(),
            created_at: None,
        }
    }

    fn state() -> AppState {
        AppState::new(ME, "Owner".into())
    }

    #[test]
    fn open_is_idempotent_per_key() {
        let mut s = state();
        assert_eq!(
            s.open_session(&offer(1, 1)),
            OpenOutcome::Opened { evicted: None }
        );
        assert_eq!(s.open_session(&offer(1, 1)), OpenOutcome::AlreadyOpen);
        assert_eq!(s.sessions().len(), 1);
    }

    #[test]
    fn fourth_session_evicts_the_oldest() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        s.open_session(&offer(2, 2));
        s.open_session(&offer(3, 3));
        assert_eq!(
            s.open_session(&offer(4, 4)),
            OpenOutcome::Opened {
                evicted: Some(SessionKey::new(1, 1))
            }
        );
        let keys: Vec<_> = s.sessions().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                SessionKey::new(2, 2),
                SessionKey::new(3, 3),
                SessionKey::new(4, 4)
            ]
        );
    }

    #[test]
    fn eviction_is_fifo_not_lru() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        s.open_session(&offer(2, 2));
        s.open_session(&offer(3, 3));
        // Touch the oldest session; FIFO must still evict it.
        s.session_mut(SessionKey::new(1, 1)).unwrap().input_text = "draft".into();
        assert_eq!(
            s.open_session(&offer(4, 4)),
            OpenOutcome::Opened {
                evicted: Some(SessionKey::new(1, 1))
            }
        );
    }

    #[test]
    fn empty_and_whitespace_drafts_send_nothing() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        let key = SessionKey::new(1, 1);

        s.session_mut(key).unwrap().input_text = String::new();
        assert!(s.send_message(key).is_none());

        s.session_mut(key).unwrap().input_text = "   ".into();
        assert!(s.send_message(key).is_none());
        assert!(s.session_mut(key).unwrap().messages.is_empty());
    }

    #[test]
    fn send_appends_own_and_clears_draft() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        let key = SessionKey::new(1, 1);
        s.session_mut(key).unwrap().input_text = "  hello  ".into();

        let msg = s.send_message(key).unwrap();
        assert_eq!(msg.message, "hello");
        assert_eq!(msg.to_user_id, 20);

        let session = s.session_mut(key).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert!(session.messages[0].own);
        assert!(session.input_text.is_empty());
    }

    #[test]
    fn own_echo_is_dropped() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        let echo = incoming(1, 1, ME, "mine");
        assert_eq!(s.receive_message(&echo), Inbound::Deduplicated);
        assert!(s.session_mut(SessionKey::new(1, 1)).unwrap().messages.is_empty());
    }

    #[test]
    fn redelivered_id_is_dropped() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        let msg = incoming(1, 1, 20, "once");
        assert_eq!(s.receive_message(&msg), Inbound::Appended(SessionKey::new(1, 1)));
        assert_eq!(s.receive_message(&msg), Inbound::Deduplicated);
        assert_eq!(s.session_mut(SessionKey::new(1, 1)).unwrap().messages.len(), 1);
    }

    #[test]
    fn message_without_session_requests_banner() {
        let mut s = state();
        let msg = incoming(5, 5, 20, "anyone there?");
        assert_eq!(s.receive_message(&msg), Inbound::NoSession);
    }

    #[test]
    fn history_does_not_duplicate_raced_messages() {
        let mut s = state();
        s.open_session(&offer(1, 1));
        let key = SessionKey::new(1, 1);

        let raced = incoming(1, 1, 20, "early");
        s.receive_message(&raced);

        let history = vec![incoming(1, 1, 20, "old"), raced.clone()];
        s.apply_history(key, &history);

        let session = s.session_mut(key).unwrap();
        assert_eq!(session.messages.len(), 2);
        assert!(session.history_loaded);
    }

    #[test]
    fn banner_click_hands_back_offer_and_dismisses() {
        let mut s = state();
        let now = Instant::now();
        s.notify(offer(1, 1), now);
        assert_eq!(s.banners.len(), 1);

        let offer = s.take_banner(0).unwrap();
        assert_eq!(offer.offer_id, 1);
        assert!(s.banners.is_empty());
        // The partner resolved from the banner is the non-current user.
        assert_eq!(offer.other_party(ME), 20);
    }

    #[test]
    fn banners_and_toasts_expire_on_schedule() {
        let mut s = state();
        let start = Instant::now();
        s.notify(offer(1, 1), start);
        s.toast("Offer accepted", ToastTone::Positive, start);

        s.prune_expired(start + Duration::from_secs(5));
        assert_eq!(s.banners.len(), 1);
        assert!(s.toasts.is_empty());

        s.prune_expired(start + Duration::from_secs(11));
        assert!(s.banners.is_empty());
    }

    #[test]
    fn accepting_updates_every_view_of_the_offer() {
        use crate::common::offer::{available_actions, price_tone, OfferAction, PriceTone};

        let mut s = state();
        let o = offer(1, 1);
        s.notify(o.clone(), Instant::now());
        s.open_session(&o);

        // The owner's pending card offers accept/decline.
        let current = s.offers.get(1).unwrap();
        assert_eq!(
            available_actions(current.status, current.role_of(ME)),
            &[OfferAction::Accept, OfferAction::Decline]
        );

        // Backend acknowledges the accept; sidebar row and chat card both
        // render from the same record, so one write updates every view.
        s.offers.apply_status(1, OfferStatus::Accepted);
        let current = s.offers.get(1).unwrap();
        assert!(available_actions(current.status, current.role_of(ME)).is_empty());
        assert_eq!(price_tone(current.status), PriceTone::Positive);
    }

    #[test]
    fn reset_drops_windows_but_keeps_offers() {
        let mut s = state();
        let now = Instant::now();
        let o = offer(1, 1);
        s.notify(o.clone(), now);
        s.open_session(&o);

        s.reset_transient();
        assert!(s.sessions().is_empty());
        assert!(s.banners.is_empty());
        assert!(s.offers.get(1).is_some());
    }
}
