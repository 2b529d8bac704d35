use std::error::Error;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::protocol::{ClientFrame, ServerFrame};
use super::rest::RestClient;
use super::ClientError;
use crate::common::offer::OfferAction;
use crate::common::types::{OfferId, UserId};
use crate::common::{NetworkCommand, NetworkEvent};
use crate::config::AppConfig;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Network task: owns the WebSocket and the REST client, bridges them to the
/// UI over the command/event channel pair.
pub struct MarketClient {
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    rest: RestClient,
    ws_url: String,
    user_id: UserId,
}

impl MarketClient {
    pub fn new(
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
        config: &AppConfig,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            rest: RestClient::new(config.server_url.clone()),
            ws_url: config.ws_url(),
            user_id: config.user_id,
        }
    }

    /// Connect, run until the UI drops its command channel. Socket loss is
    /// reported as an event and retried after a fixed delay; there is no
    /// history backfill on reconnect.
    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        loop {
            match self.run_connection().await {
                Ok(()) => {
                    log::info!("Command channel closed; network task stopping");
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("Socket lost: {err}");
                    self.emit(NetworkEvent::Disconnected {
                        reason: err.to_string(),
                    })
                    .await;
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    async fn run_connection(&mut self) -> Result<(), ClientError> {
        log::info!("Connecting to {}", self.ws_url);
        let (socket, _) = connect_async(self.ws_url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        // Per-user room first, so offer pushes arrive with no window open.
        let room = format!("user_{}", self.user_id);
        send_frame(&mut sink, &ClientFrame::JoinUser { room }).await?;
        self.emit(NetworkEvent::Connected).await;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut sink).await?,
                        None => return Ok(()),
                    }
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                        Some(Ok(Message::Close(_))) | None => {
                            return Err(ClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err.into()),
                    }
                }
            }
        }
    }

    /// Socket sends propagate errors (the connection is gone); REST calls
    /// never do — their outcome always becomes an event or a log line.
    async fn handle_command(
        &mut self,
        command: NetworkCommand,
        sink: &mut WsSink,
    ) -> Result<(), ClientError> {
        match command {
            NetworkCommand::JoinRoom(key) => {
                send_frame(sink, &ClientFrame::Join { room: key.room() }).await
            }
            NetworkCommand::SendMessage(message) => {
                send_frame(sink, &ClientFrame::SendMessage(message)).await
            }
            NetworkCommand::FetchHistory(key) => {
                let event = match self.rest.chat_history(key).await {
                    Ok(resp) => NetworkEvent::HistoryLoaded {
                        key,
                        messages: resp.messages,
                        offer: Box::new(resp.offer),
                    },
                    Err(err) => {
                        log::warn!("History fetch for {} failed: {err}", key.room());
                        NetworkEvent::HistoryFailed {
                            key,
                            error: err.to_string(),
                        }
                    }
                };
                self.emit(event).await;
                Ok(())
            }
            NetworkCommand::OfferAction { offer_id, action } => {
                self.run_offer_action(offer_id, action).await;
                Ok(())
            }
            NetworkCommand::SubmitOffer { offer_id, update } => {
                let event = match self.rest.update_offer(offer_id, &update).await {
                    Ok(()) => NetworkEvent::OfferSubmitted { offer_id },
                    Err(err) => NetworkEvent::OfferSubmitFailed {
                        offer_id,
                        error: err.to_string(),
                    },
                };
                self.emit(event).await;
                Ok(())
            }
            NetworkCommand::FetchOffer(offer_id) => {
                match self.rest.offer_info(offer_id).await {
                    Ok(offer) => self.emit(NetworkEvent::OfferFetched(Box::new(offer))).await,
                    Err(err) => log::warn!("Offer {offer_id} refetch failed: {err}"),
                }
                Ok(())
            }
            NetworkCommand::MarkSeen(offer_id) => {
                // Badge bookkeeping only; not worth surfacing to the user.
                if let Err(err) = self.rest.mark_seen(offer_id).await {
                    log::warn!("mark_seen for offer {offer_id} failed: {err}");
                }
                Ok(())
            }
            NetworkCommand::BlockCompany(company_id) => {
                let event = match self.rest.block_company(company_id).await {
                    Ok(()) => NetworkEvent::CompanyBlocked { company_id },
                    Err(err) => NetworkEvent::CompanyBlockFailed {
                        company_id,
                        error: err.to_string(),
                    },
                };
                self.emit(event).await;
                Ok(())
            }
        }
    }

    async fn run_offer_action(&mut self, offer_id: OfferId, action: OfferAction) {
        let Some(status) = action.resulting_status() else {
            log::warn!("Re-offer is UI-local; ignoring network command");
            return;
        };
        let result = match action {
            OfferAction::Accept => self.rest.accept_offer(offer_id).await,
            OfferAction::Decline => self.rest.decline_offer(offer_id).await,
            OfferAction::Finalize => self.rest.finalize_or_withdraw(offer_id, "finalize").await,
            OfferAction::Withdraw => self.rest.finalize_or_withdraw(offer_id, "withdraw").await,
            // Filtered by the guard above.
            OfferAction::ReOffer => return,
        };
        let event = match result {
            Ok(()) => NetworkEvent::ActionCompleted { offer_id, status },
            Err(err) => {
                log::warn!("{} for offer {offer_id} failed: {err}", action.label());
                NetworkEvent::ActionFailed {
                    offer_id,
                    action,
                    error: err.to_string(),
                }
            }
        };
        self.emit(event).await;
    }

    async fn handle_frame(&mut self, text: &str) {
        let frame = match serde_json::from_str::<ServerFrame>(text) {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("Unrecognized frame: {err}");
                return;
            }
        };
        let event = match frame {
            ServerFrame::NewOffer(offer) => NetworkEvent::NewOffer(offer),
            ServerFrame::ReceiveMessage(message) => NetworkEvent::MessageReceived(message),
            ServerFrame::OfferStatusUpdate { offer_id, status } => {
                NetworkEvent::StatusPushed { offer_id, status }
            }
            ServerFrame::OfferUpdated { offer_id, update } => {
                NetworkEvent::OfferEdited { offer_id, update }
            }
        };
        self.emit(event).await;
    }

    async fn emit(&self, event: NetworkEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to forward event to UI: {err}");
        }
    }
}

async fn send_frame(sink: &mut WsSink, frame: &ClientFrame) -> Result<(), ClientError> {
    let payload = serde_json::to_string(frame)?;
    sink.send(Message::Text(payload)).await?;
    Ok(())
}
