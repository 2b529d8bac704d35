use eframe::egui;

use crate::common::offer::{available_actions, price_tone, Offer, OfferAction, PriceTone};
use crate::common::types::UserId;

pub fn tone_color(tone: PriceTone) -> egui::Color32 {
    match tone {
        PriceTone::Neutral => egui::Color32::from_rgb(0x2d, 0x7d, 0xd2),
        PriceTone::Positive => egui::Color32::from_rgb(0x2e, 0x7d, 0x32),
        PriceTone::Negative => egui::Color32::from_rgb(0xc6, 0x28, 0x28),
    }
}

/// Offer summary pinned above the message list. Everything shown here is a
/// projection of the offer record; nothing is read back out of the UI.
pub fn render(ui: &mut egui::Ui, offer: &Offer, me: UserId) -> Option<OfferAction> {
    let mut clicked = None;
    let role = offer.role_of(me);
    let actions = available_actions(offer.status, role);
    let color = tone_color(price_tone(offer.status));

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(format!("⬆ {}", offer.origin));
                ui.label(egui::RichText::new(&offer.pickup_date).small().strong());
                ui.label(egui::RichText::new(offer.price_line()).color(color).strong());
            });
            ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                ui.label(format!("{} ⬇", offer.destination));
                ui.label(egui::RichText::new(&offer.arrival_date).small().strong());
                ui.label(egui::RichText::new(offer.status.as_str()).small().color(color));
            });
        });

        if !actions.is_empty() {
            ui.horizontal(|ui| {
                for action in actions {
                    if ui.button(action.label()).clicked() {
                        clicked = Some(*action);
                    }
                }
            });
        }

        if !offer.note.is_empty() {
            ui.separator();
            ui.label(egui::RichText::new(&offer.note).italics());
        }
    });

    clicked
}
