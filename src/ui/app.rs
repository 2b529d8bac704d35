use std::time::Instant;

use eframe::egui;
use tokio::sync::mpsc;

use super::components::chat_window::{self, WindowResponse};
use super::components::offer_editor::{self, EditorOutcome, OfferEditor};
use super::components::{notifications, sidebar};
use super::state::{AppState, Inbound, OpenOutcome, ToastTone};
use crate::common::offer::{Offer, OfferAction, OfferStatus, Role};
use crate::common::types::{CompanyId, OfferId, SessionKey};
use crate::common::{NetworkCommand, NetworkEvent};

/// A destructive action waiting for the user's yes/no.
enum PendingConfirm {
    Action {
        offer_id: OfferId,
        action: OfferAction,
    },
    Block {
        company_id: CompanyId,
    },
}

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
    editor: Option<OfferEditor>,
    confirm: Option<PendingConfirm>,
    alert: Option<String>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        state: AppState,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        Self {
            state,
            command_sender,
            event_receiver,
            editor: None,
            confirm: None,
            alert: None,
        }
    }

    fn send_command(&mut self, command: NetworkCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to network: {err}");
        }
    }

    fn handle_network_events(&mut self, now: Instant) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                NetworkEvent::Connected => self.state.connected = true,
                NetworkEvent::Disconnected { reason } => {
                    log::warn!("Realtime channel lost: {reason}");
                    self.state.connected = false;
                }
                NetworkEvent::NewOffer(offer) => self.state.notify(offer, now),
                NetworkEvent::MessageReceived(message) => {
                    match self.state.receive_message(&message) {
                        Inbound::NoSession => {
                            match self.state.offers.get(message.offer_id).cloned() {
                                Some(offer) => self.state.notify(offer, now),
                                // Unknown offer: fetch the snapshot so the
                                // sidebar picks it up.
                                None => {
                                    self.send_command(NetworkCommand::FetchOffer(message.offer_id))
                                }
                            }
                        }
                        Inbound::Appended(_) | Inbound::Deduplicated => {}
                    }
                }
                NetworkEvent::StatusPushed { offer_id, status } => {
                    self.state.offers.apply_status(offer_id, status);
                }
                NetworkEvent::OfferEdited { offer_id, update } => {
                    self.state.offers.apply_update(offer_id, &update);
                }
                NetworkEvent::HistoryLoaded {
                    key,
                    messages,
                    offer,
                } => {
                    self.state.offers.upsert(*offer);
                    self.state.apply_history(key, &messages);
                }
                NetworkEvent::HistoryFailed { key, .. } => {
                    // Already logged by the network task; just stop the
                    // loading hint.
                    if let Some(session) = self.state.session_mut(key) {
                        session.history_loaded = true;
                    }
                }
                NetworkEvent::OfferFetched(offer) => self.state.offers.upsert(*offer),
                NetworkEvent::ActionCompleted { offer_id, status } => {
                    self.state.offers.apply_status(offer_id, status);
                    let tone = if status == OfferStatus::Accepted {
                        ToastTone::Positive
                    } else {
                        ToastTone::Negative
                    };
                    self.state.toast(format!("Offer {}", status.as_str()), tone, now);
                }
                NetworkEvent::ActionFailed { action, error, .. } => {
                    self.alert = Some(format!("{} failed: {error}", action.label()));
                }
                NetworkEvent::OfferSubmitted { offer_id } => {
                    self.editor = None;
                    self.state.reset_transient();
                    self.state.toast("Offer sent", ToastTone::Positive, now);
                    self.send_command(NetworkCommand::FetchOffer(offer_id));
                }
                NetworkEvent::OfferSubmitFailed { offer_id, error } => {
                    match self.editor.as_mut().filter(|e| e.offer_id == offer_id) {
                        Some(editor) => editor.error = Some(error),
                        None => self.alert = Some(format!("Offer update failed: {error}")),
                    }
                }
                NetworkEvent::CompanyBlocked { company_id } => {
                    self.state.blocked_companies.insert(company_id);
                    self.state.toast("Company blocked", ToastTone::Positive, now);
                }
                NetworkEvent::CompanyBlockFailed { error, .. } => {
                    self.alert = Some(format!("Block failed: {error}"));
                }
            }
        }
    }

    /// Open (or focus) the chat for an offer: register the session, join the
    /// room, pull history, and clear the "new" badge when the owner looks at
    /// a pending offer.
    fn open_offer_chat(&mut self, offer: Offer) {
        self.state.offers.upsert(offer.clone());
        let key = SessionKey::new(offer.cargo_id, offer.offer_id);
        match self.state.open_session(&offer) {
            OpenOutcome::AlreadyOpen => {}
            OpenOutcome::Opened { evicted } => {
                if let Some(old) = evicted {
                    log::info!("Evicted oldest chat window {}", old.room());
                }
                self.send_command(NetworkCommand::JoinRoom(key));
                self.send_command(NetworkCommand::FetchHistory(key));
                if offer.role_of(self.state.me) == Role::CargoOwner
                    && offer.status == OfferStatus::Pending
                    && !offer.seen
                {
                    self.state.offers.mark_seen(offer.offer_id);
                    self.send_command(NetworkCommand::MarkSeen(offer.offer_id));
                }
            }
        }
    }

    fn on_card_action(&mut self, offer_id: OfferId, action: OfferAction) {
        match action {
            OfferAction::ReOffer => {
                if let Some(offer) = self.state.offers.get(offer_id) {
                    self.editor = Some(OfferEditor::from_offer(offer));
                }
            }
            _ => self.confirm = Some(PendingConfirm::Action { offer_id, action }),
        }
    }

    /// The confirmed transition is re-checked against the current record: a
    /// push may have landed while the dialog was open, in which case the
    /// action is silently dropped.
    fn run_confirmed(&mut self, confirm: PendingConfirm) {
        match confirm {
            PendingConfirm::Action { offer_id, action } => {
                let legal = action
                    .resulting_status()
                    .zip(self.state.offers.get(offer_id))
                    .is_some_and(|(next, offer)| offer.status.permits(next));
                if legal {
                    self.send_command(NetworkCommand::OfferAction { offer_id, action });
                } else {
                    log::info!(
                        "{} no longer legal for offer {offer_id}; dropped",
                        action.label()
                    );
                }
            }
            PendingConfirm::Block { company_id } => {
                self.send_command(NetworkCommand::BlockCompany(company_id));
            }
        }
    }

    fn render_chat_windows(&mut self, ctx: &egui::Context) {
        let keys: Vec<SessionKey> = self.state.sessions().iter().map(|s| s.key).collect();
        let mut responses: Vec<(SessionKey, WindowResponse)> = Vec::new();

        for (index, key) in keys.iter().enumerate() {
            let offer = self.state.offers.get(key.offer_id).cloned();
            let blocked = offer
                .as_ref()
                .and_then(|o| o.company_id)
                .map(|id| self.state.blocked_companies.contains(&id))
                .unwrap_or(false);
            let me = self.state.me;
            let Some(session) = self.state.session_mut(*key) else {
                continue;
            };
            let response = chat_window::render(ctx, index, session, offer.as_ref(), me, blocked);
            responses.push((*key, response));
        }

        for (key, response) in responses {
            if response.submitted {
                if let Some(message) = self.state.send_message(key) {
                    self.send_command(NetworkCommand::SendMessage(message));
                }
            }
            if let Some(action) = response.card_action {
                self.on_card_action(key.offer_id, action);
            }
            if let Some(company_id) = response.block_company {
                self.confirm = Some(PendingConfirm::Block { company_id });
            }
            if response.closed {
                self.state.close_session(key);
            }
        }
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let Some(mut editor) = self.editor.take() else {
            return;
        };
        match offer_editor::render(ctx, &mut editor) {
            EditorOutcome::Cancel => {}
            EditorOutcome::Open => self.editor = Some(editor),
            // The modal stays open until the backend acknowledges.
            EditorOutcome::Submit => {
                match editor.parse() {
                    Ok(update) => {
                        editor.error = None;
                        let offer_id = editor.offer_id;
                        self.send_command(NetworkCommand::SubmitOffer { offer_id, update });
                    }
                    Err(reason) => editor.error = Some(reason),
                }
                self.editor = Some(editor);
            }
        }
    }

    fn render_confirm(&mut self, ctx: &egui::Context) {
        let Some(confirm) = &self.confirm else {
            return;
        };
        let prompt = match confirm {
            PendingConfirm::Action { action, .. } => format!("{} this offer?", action.label()),
            PendingConfirm::Block { .. } => "Block this company?".to_string(),
        };

        let mut decision = None;
        egui::Window::new("Confirm")
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("No").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                if let Some(confirm) = self.confirm.take() {
                    self.run_confirmed(confirm);
                }
            }
            Some(false) => self.confirm = None,
            None => {}
        }
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Error")
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.handle_network_events(now);
        self.state.prune_expired(now);

        egui::SidePanel::left("offer_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let actions = sidebar::render(ui, &self.state);
                if let Some(offer_id) = actions.open_offer {
                    if let Some(offer) = self.state.offers.get(offer_id).cloned() {
                        self.open_offer_chat(offer);
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Freight Market Chat");
            ui.label(format!("Signed in as {}", self.state.user_name));
            ui.separator();
            ui.label(
                egui::RichText::new(
                    "Offers arrive in the sidebar and as banners; click one to negotiate.",
                )
                .weak(),
            );
        });

        if let Some(index) = notifications::render_banners(ctx, &self.state.banners) {
            if let Some(offer) = self.state.take_banner(index) {
                self.open_offer_chat(offer);
            }
        }
        notifications::render_toasts(ctx, &self.state.toasts);

        self.render_chat_windows(ctx);
        self.render_editor(ctx);
        self.render_confirm(ctx);
        self.render_alert(ctx);

        ctx.request_repaint();
    }
}
