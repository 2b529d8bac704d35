use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{CargoId, CompanyId, OfferId, Participant, UserId};

/// Lifecycle of an offer. Status only moves forward along the transitions
/// in [`OfferStatus::permits`]; a stale or repeated push never reverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Finalized,
    Withdrawn,
}

impl OfferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OfferStatus::Declined | OfferStatus::Finalized | OfferStatus::Withdrawn
        )
    }

    /// Permitted forward transitions. Everything else (including re-setting
    /// the current status) is ignored by [`OfferBook::apply_status`].
    pub fn permits(self, next: OfferStatus) -> bool {
        matches!(
            (self, next),
            (OfferStatus::Pending, OfferStatus::Accepted)
                | (OfferStatus::Pending, OfferStatus::Declined)
                | (OfferStatus::Accepted, OfferStatus::Finalized)
                | (OfferStatus::Accepted, OfferStatus::Withdrawn)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
            OfferStatus::Finalized => "finalized",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }
}

/// How the current user relates to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    CargoOwner,
    OfferSender,
    Other,
}

/// Buttons a card can show. `ReOffer` is handled locally (opens the editor
/// modal); the rest each map to one REST call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Accept,
    Decline,
    Finalize,
    Withdraw,
    ReOffer,
}

impl OfferAction {
    /// Status the backend sets when the action succeeds.
    pub fn resulting_status(self) -> Option<OfferStatus> {
        match self {
            OfferAction::Accept => Some(OfferStatus::Accepted),
            OfferAction::Decline => Some(OfferStatus::Declined),
            OfferAction::Finalize => Some(OfferStatus::Finalized),
            OfferAction::Withdraw => Some(OfferStatus::Withdrawn),
            OfferAction::ReOffer => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OfferAction::Accept => "Accept",
            OfferAction::Decline => "Decline",
            OfferAction::Finalize => "Finalize",
            OfferAction::Withdraw => "Withdraw",
            OfferAction::ReOffer => "New offer",
        }
    }
}

/// Color bucket for the price line of a card or list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTone {
    Neutral,
    Positive,
    Negative,
}

pub fn price_tone(status: OfferStatus) -> PriceTone {
    match status {
        OfferStatus::Pending => PriceTone::Neutral,
        OfferStatus::Accepted | OfferStatus::Finalized => PriceTone::Positive,
        OfferStatus::Declined | OfferStatus::Withdrawn => PriceTone::Negative,
    }
}

/// The single action table every view renders from. Pure in (status, role);
/// call order cannot influence the result.
pub fn available_actions(status: OfferStatus, role: Role) -> &'static [OfferAction] {
    match (status, role) {
        (OfferStatus::Pending, Role::CargoOwner) => &[OfferAction::Accept, OfferAction::Decline],
        (OfferStatus::Pending, Role::OfferSender) => &[OfferAction::ReOffer],
        (OfferStatus::Accepted, Role::OfferSender) => {
            &[OfferAction::Finalize, OfferAction::Withdraw]
        }
        (OfferStatus::Declined, Role::OfferSender) => &[OfferAction::ReOffer],
        _ => &[],
    }
}

/// One offer as mirrored from the backend. Field names follow the wire
/// payloads (`new_offer`, `/offer_info`, `/chat_history`) so the same struct
/// decodes all of them; `to_user_id` is the cargo owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub cargo_id: CargoId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(default)]
    pub from_user: String,
    #[serde(default)]
    pub to_user: String,
    #[serde(default)]
    pub user_company: String,
    /// Present only when the backend exposes the sender's company for
    /// blocklisting.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub profile_picture: String,
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub pickup_date: String,
    #[serde(default)]
    pub arrival_date: String,
    #[serde(default)]
    pub status: OfferStatus,
    #[serde(default)]
    pub seen: bool,
}

impl Offer {
    pub fn role_of(&self, user_id: UserId) -> Role {
        if user_id == self.to_user_id {
            Role::CargoOwner
        } else if user_id == self.from_user_id {
            Role::OfferSender
        } else {
            Role::Other
        }
    }

    /// Id of whichever participant is not `user_id`.
    pub fn other_party(&self, user_id: UserId) -> UserId {
        if user_id == self.from_user_id {
            self.to_user_id
        } else {
            self.from_user_id
        }
    }

    /// Header metadata for a chat window opened against this offer. Display
    /// fields are only carried for the sender side; the owner falls back to
    /// the plain name.
    pub fn partner_view(&self, user_id: UserId) -> Participant {
        let partner_id = self.other_party(user_id);
        if partner_id == self.from_user_id {
            Participant {
                user_id: partner_id,
                name: self.from_user.clone(),
                company: self.user_company.clone(),
                avatar: self.profile_picture.clone(),
            }
        } else {
            Participant {
                user_id: partner_id,
                name: self.to_user.clone(),
                company: String::new(),
                avatar: String::new(),
            }
        }
    }

    pub fn price_line(&self) -> String {
        format!("{} {}", self.price, self.currency.to_uppercase())
    }
}

/// Fields the re-offer editor submits to `/cargo/offer/update/{offer_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferUpdate {
    pub pickup_date: String,
    pub arrival_date: String,
    pub price: f64,
    pub currency: String,
    pub note: String,
}

/// Outcome of applying a server-pushed or locally-confirmed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Ignored,
}

/// Registry of every offer the client knows about. All views (sidebar rows,
/// chat cards) render from this one copy, and every status change funnels
/// through [`OfferBook::apply_status`].
#[derive(Debug, Default)]
pub struct OfferBook {
    offers: HashMap<OfferId, Offer>,
}

impl OfferBook {
    pub fn get(&self, offer_id: OfferId) -> Option<&Offer> {
        self.offers.get(&offer_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offer> {
        self.offers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Insert or refresh a snapshot. An already-known offer keeps its status
    /// unless the snapshot's status is a permitted forward transition, so a
    /// stale fetch cannot roll back a push that already landed.
    pub fn upsert(&mut self, offer: Offer) {
        match self.offers.get_mut(&offer.offer_id) {
            Some(existing) => {
                let status = if existing.status.permits(offer.status) {
                    offer.status
                } else {
                    existing.status
                };
                let seen = existing.seen || offer.seen;
                *existing = offer;
                existing.status = status;
                existing.seen = seen;
            }
            None => {
                self.offers.insert(offer.offer_id, offer);
            }
        }
    }

    /// The shared update routine: one status write, observed by every view.
    pub fn apply_status(&mut self, offer_id: OfferId, status: OfferStatus) -> Applied {
        let Some(offer) = self.offers.get_mut(&offer_id) else {
            return Applied::Ignored;
        };
        if offer.status.permits(status) {
            offer.status = status;
            Applied::Changed
        } else {
            Applied::Ignored
        }
    }

    pub fn mark_seen(&mut self, offer_id: OfferId) {
        if let Some(offer) = self.offers.get_mut(&offer_id) {
            offer.seen = true;
        }
    }

    /// Apply edited terms from an `offer_updated` push. Status is not a
    /// field the push may change.
    pub fn apply_update(&mut self, offer_id: OfferId, update: &OfferUpdate) -> Applied {
        let Some(offer) = self.offers.get_mut(&offer_id) else {
            return Applied::Ignored;
        };
        offer.pickup_date = update.pickup_date.clone();
        offer.arrival_date = update.arrival_date.clone();
        offer.price = update.price;
        offer.currency = update.currency.clone();
        offer.note = update.note.clone();
        Applied::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(status: OfferStatus) -> Offer {
        Offer {
            offer_id: 7,
            cargo_id: 3,
            from_user_id: 20,
            to_user_id: 10,
            from_user: "Carrier Kft".into(),
            to_user: "Owner Bt".into(),
            user_company: "Carrier Kft".into(),
            company_id: Some(5),
            profile_picture: String::new(),
            price: 950.0,
            currency: "eur".into(),
            note: String::new(),
            origin: "Wien".into(),
            destination: "Budapest".into(),
            pickup_date: "2025-03-01".into(),
            arrival_date: "2025-03-02".into(),
            status,
            seen: false,
        }
    }

    #[test]
    fn action_table_matches_contract() {
        use OfferAction::*;
        use OfferStatus::*;
        use Role::*;

        let cases: &[(OfferStatus, Role, &[OfferAction])] = &[
            (Pending, CargoOwner, &[Accept, Decline]),
            (Pending, OfferSender, &[ReOffer]),
            (Pending, Other, &[]),
            (Accepted, CargoOwner, &[]),
            (Accepted, OfferSender, &[Finalize, Withdraw]),
            (Declined, CargoOwner, &[]),
            (Declined, OfferSender, &[ReOffer]),
            (Finalized, CargoOwner, &[]),
            (Finalized, OfferSender, &[]),
            (Withdrawn, CargoOwner, &[]),
            (Withdrawn, OfferSender, &[]),
        ];
        for (status, role, expected) in cases {
            assert_eq!(
                available_actions(*status, *role),
                *expected,
                "status={status:?} role={role:?}"
            );
        }
    }

    #[test]
    fn price_tone_matches_contract() {
        assert_eq!(price_tone(OfferStatus::Pending), PriceTone::Neutral);
        assert_eq!(price_tone(OfferStatus::Accepted), PriceTone::Positive);
        assert_eq!(price_tone(OfferStatus::Finalized), PriceTone::Positive);
        assert_eq!(price_tone(OfferStatus::Declined), PriceTone::Negative);
        assert_eq!(price_tone(OfferStatus::Withdrawn), PriceTone::Negative);
    }

    #[test]
    fn status_is_monotonic() {
        let mut book = OfferBook::default();
        book.upsert(offer(OfferStatus::Pending));

        assert_eq!(book.apply_status(7, OfferStatus::Accepted), Applied::Changed);
        // Late pending push must not revert.
        assert_eq!(book.apply_status(7, OfferStatus::Pending), Applied::Ignored);
        assert_eq!(book.get(7).unwrap().status, OfferStatus::Accepted);

        assert_eq!(
            book.apply_status(7, OfferStatus::Finalized),
            Applied::Changed
        );
        // Terminal: nothing further applies.
        assert_eq!(
            book.apply_status(7, OfferStatus::Withdrawn),
            Applied::Ignored
        );
        assert_eq!(book.get(7).unwrap().status, OfferStatus::Finalized);
    }

    #[test]
    fn repeated_status_application_is_ignored() {
        let mut book = OfferBook::default();
        book.upsert(offer(OfferStatus::Pending));
        assert_eq!(book.apply_status(7, OfferStatus::Accepted), Applied::Changed);
        assert_eq!(book.apply_status(7, OfferStatus::Accepted), Applied::Ignored);
    }

    #[test]
    fn unknown_offer_is_ignored() {
        let mut book = OfferBook::default();
        assert_eq!(
            book.apply_status(99, OfferStatus::Accepted),
            Applied::Ignored
        );
    }

    #[test]
    fn stale_snapshot_cannot_roll_back_status() {
        let mut book = OfferBook::default();
        book.upsert(offer(OfferStatus::Pending));
        book.apply_status(7, OfferStatus::Accepted);

        // A refetch that still says pending keeps the accepted status.
        book.upsert(offer(OfferStatus::Pending));
        assert_eq!(book.get(7).unwrap().status, OfferStatus::Accepted);

        // A snapshot that is a legal step forward applies.
        book.upsert(offer(OfferStatus::Finalized));
        assert_eq!(book.get(7).unwrap().status, OfferStatus::Finalized);
    }

    #[test]
    fn roles_and_partner_resolution() {
        let o = offer(OfferStatus::Pending);
        assert_eq!(o.role_of(10), Role::CargoOwner);
        assert_eq!(o.role_of(20), Role::OfferSender);
        assert_eq!(o.role_of(99), Role::Other);

        assert_eq!(o.other_party(10), 20);
        assert_eq!(o.other_party(20), 10);

        let partner = o.partner_view(10);
        assert_eq!(partner.user_id, 20);
        assert_eq!(partner.name, "Carrier Kft");
    }

    #[test]
    fn update_changes_terms_but_not_status() {
        let mut book = OfferBook::default();
        book.upsert(offer(OfferStatus::Declined));
        let update = OfferUpdate {
            pickup_date: "2025-03-05".into(),
            arrival_date: "2025-03-06".into(),
            price: 1100.0,
            currency: "eur".into(),
            note: "new terms".into(),
        };
        assert_eq!(book.apply_update(7, &update), Applied::Changed);
        let o = book.get(7).unwrap();
        assert_eq!(o.price, 1100.0);
        assert_eq!(o.status, OfferStatus::Declined);
    }
}
