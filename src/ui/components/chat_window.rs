use eframe::egui;

use super::offer_card;
use crate::common::offer::{Offer, OfferAction, Role};
use crate::common::types::{CompanyId, UserId};
use crate::ui::state::ChatSession;

const WINDOW_WIDTH: f32 = 300.0;
const WINDOW_GAP: f32 = 10.0;

/// What the user did inside one chat window this frame.
#[derive(Default)]
pub struct WindowResponse {
    pub submitted: bool,
    pub closed: bool,
    pub card_action: Option<OfferAction>,
    pub block_company: Option<CompanyId>,
}

/// One floating chat window, anchored bottom-right and stacked by index.
/// Positions fall out of the session order, so the layout recomputes itself
/// whenever a window opens or closes.
pub fn render(
    ctx: &egui::Context,
    index: usize,
    session: &mut ChatSession,
    offer: Option<&Offer>,
    me: UserId,
    blocked: bool,
) -> WindowResponse {
    let mut response = WindowResponse::default();
    let mut open = true;

    let offset_x = -WINDOW_GAP - index as f32 * (WINDOW_WIDTH + WINDOW_GAP);
    let title = if session.partner.company.is_empty() {
        session.partner.name.clone()
    } else {
        format!("{} ({})", session.partner.name, session.partner.company)
    };

    egui::Window::new(title)
        .id(egui::Id::new(session.key))
        .open(&mut open)
        .anchor(egui::Align2::RIGHT_BOTTOM, [offset_x, -WINDOW_GAP])
        .default_width(WINDOW_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            if let Some(offer) = offer {
                response.card_action = offer_card::render(ui, offer, me);
                if let Some(company_id) = offer.company_id {
                    if offer.role_of(me) != Role::OfferSender {
                        ui.add_enabled_ui(!blocked, |ui| {
                            let label = if blocked { "Blocked" } else { "Block company" };
                            if ui.small_button(label).clicked() {
                                response.block_company = Some(company_id);
                            }
                        });
                    }
                }
                ui.separator();
            }

            egui::ScrollArea::vertical()
                .max_height(220.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if !session.history_loaded && session.messages.is_empty() {
                        ui.label(egui::RichText::new("Loading history…").weak());
                    }
                    for message in &session.messages {
                        let align = if message.own {
                            egui::Align::Max
                        } else {
                            egui::Align::Min
                        };
                        ui.with_layout(egui::Layout::top_down(align), |ui| {
                            ui.label(&message.text);
                        });
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                let edit = ui.text_edit_singleline(&mut session.input_text);
                if ui.button("Send").clicked() {
                    response.submitted = true;
                }
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    response.submitted = true;
                }
            });
        });

    response.closed = !open;
    response
}
