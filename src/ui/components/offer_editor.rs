use eframe::egui;

use crate::common::offer::{Offer, OfferUpdate};
use crate::common::types::OfferId;

/// Draft state of the re-offer modal. Fields stay as text until submit so
/// the user can type freely; parsing happens once, on submit.
pub struct OfferEditor {
    pub offer_id: OfferId,
    pub pickup_date: String,
    pub arrival_date: String,
    pub price: String,
    pub currency: String,
    pub note: String,
    pub error: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum EditorOutcome {
    Open,
    Submit,
    Cancel,
}

impl OfferEditor {
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            offer_id: offer.offer_id,
            pickup_date: offer.pickup_date.clone(),
            arrival_date: offer.arrival_date.clone(),
            price: offer.price.to_string(),
            currency: offer.currency.clone(),
            note: offer.note.clone(),
            error: None,
        }
    }

    /// Local validation; a failure keeps the modal open with the reason
    /// shown and nothing sent.
    pub fn parse(&self) -> Result<OfferUpdate, String> {
        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| format!("Invalid price: {}", self.price))?;
        if price <= 0.0 {
            return Err("Price must be positive".to_string());
        }
        if self.pickup_date.trim().is_empty() || self.arrival_date.trim().is_empty() {
            return Err("Both dates are required".to_string());
        }
        if self.currency.trim().is_empty() {
            return Err("Currency is required".to_string());
        }
        Ok(OfferUpdate {
            pickup_date: self.pickup_date.trim().to_string(),
            arrival_date: self.arrival_date.trim().to_string(),
            price,
            currency: self.currency.trim().to_lowercase(),
            note: self.note.trim().to_string(),
        })
    }
}

pub fn render(ctx: &egui::Context, editor: &mut OfferEditor) -> EditorOutcome {
    let mut outcome = EditorOutcome::Open;

    egui::Window::new("New offer")
        .id(egui::Id::new(("offer_editor", editor.offer_id)))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("offer_editor_grid")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("Pickup date");
                    ui.text_edit_singleline(&mut editor.pickup_date);
                    ui.end_row();
                    ui.label("Arrival date");
                    ui.text_edit_singleline(&mut editor.arrival_date);
                    ui.end_row();
                    ui.label("Price");
                    ui.text_edit_singleline(&mut editor.price);
                    ui.end_row();
                    ui.label("Currency");
                    ui.text_edit_singleline(&mut editor.currency);
                    ui.end_row();
                    ui.label("Note");
                    ui.text_edit_singleline(&mut editor.note);
                    ui.end_row();
                });

            if let Some(error) = &editor.error {
                ui.colored_label(egui::Color32::from_rgb(0xc6, 0x28, 0x28), error);
            }

            ui.horizontal(|ui| {
                if ui.button("Send offer").clicked() {
                    outcome = EditorOutcome::Submit;
                }
                if ui.button("Cancel").clicked() {
                    outcome = EditorOutcome::Cancel;
                }
            });
        });

    outcome
}
