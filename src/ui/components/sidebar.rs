use eframe::egui;

use super::offer_card::tone_color;
use crate::common::offer::{price_tone, Role};
use crate::common::types::OfferId;
use crate::ui::state::AppState;

#[derive(Default)]
pub struct SidebarActions {
    pub open_offer: Option<OfferId>,
}

/// Offer list, one row per known offer. Rows render straight from the offer
/// book, so a status change lands here and in any open chat card at once.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.heading("Offers");
    ui.horizontal(|ui| {
        let (color, label) = if state.connected {
            (egui::Color32::GREEN, "online")
        } else {
            (egui::Color32::GRAY, "offline")
        };
        ui.colored_label(color, "●");
        ui.label(egui::RichText::new(label).weak());
    });
    ui.separator();

    if state.offers.is_empty() {
        ui.label("No offers yet");
        return actions;
    }

    let mut offers: Vec<_> = state.offers.iter().collect();
    offers.sort_by_key(|o| o.offer_id);

    egui::ScrollArea::vertical().show(ui, |ui| {
        for offer in offers {
            let color = tone_color(price_tone(offer.status));
            ui.horizontal(|ui| {
                if offer.role_of(state.me) == Role::CargoOwner && !offer.seen {
                    ui.colored_label(egui::Color32::GOLD, "●");
                }
                ui.vertical(|ui| {
                    let route = format!("{} → {}", offer.origin, offer.destination);
                    let route = if offer.status.is_terminal() {
                        egui::RichText::new(route).weak()
                    } else {
                        egui::RichText::new(route)
                    };
                    if ui.link(route).clicked() {
                        actions.open_offer = Some(offer.offer_id);
                    }
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(offer.price_line()).color(color).strong());
                        ui.label(egui::RichText::new(offer.status.as_str()).weak());
                    });
                });
            });
            ui.separator();
        }
    });

    actions
}
