use eframe::egui;

use super::offer_card::tone_color;
use crate::common::offer::price_tone;
use crate::ui::state::{Banner, Toast, ToastTone};

/// Offer banners, stacked top-right. Returns the index of a clicked banner;
/// the caller dismisses it and opens the chat.
pub fn render_banners(ctx: &egui::Context, banners: &[Banner]) -> Option<usize> {
    let mut clicked = None;
    for (index, banner) in banners.iter().enumerate() {
        let offer = &banner.offer;
        egui::Area::new(egui::Id::new(("banner", offer.offer_id)))
            .anchor(
                egui::Align2::RIGHT_TOP,
                [-10.0, 10.0 + index as f32 * 84.0],
            )
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    let text = format!(
                        "{} sent a new offer\n{} → {}\n{}",
                        offer.from_user,
                        offer.origin,
                        offer.destination,
                        offer.price_line()
                    );
                    let label = egui::RichText::new(text).color(tone_color(price_tone(offer.status)));
                    if ui.add(egui::Button::new(label).frame(false)).clicked() {
                        clicked = Some(index);
                    }
                });
            });
    }
    clicked
}

/// Color-coded toasts, stacked top-center. The container is the list itself:
/// when no toast is alive nothing is created at all.
pub fn render_toasts(ctx: &egui::Context, toasts: &[Toast]) {
    for (index, toast) in toasts.iter().enumerate() {
        let color = match toast.tone {
            ToastTone::Positive => egui::Color32::from_rgb(0x2e, 0x7d, 0x32),
            ToastTone::Negative => egui::Color32::from_rgb(0xc6, 0x28, 0x28),
        };
        egui::Area::new(egui::Id::new(("toast", index)))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 10.0 + index as f32 * 34.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new(&toast.text).color(color).strong());
                });
            });
    }
}
