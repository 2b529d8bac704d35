mod common;
mod config;
mod network;
mod ui;

use clap::Parser;
use config::AppConfig;
use dotenvy::dotenv;
use network::MarketClient;
use tokio::sync::mpsc;
use ui::state::AppState;
use ui::ChatApp;

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::parse();
    log::info!(
        "Starting as user {} against {}",
        config.user_id,
        config.server_url
    );

    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let network_config = config.clone();
    tokio::spawn(async move {
        let client = MarketClient::new(event_tx, cmd_rx, &network_config);
        if let Err(err) = client.run().await {
            log::error!("Network client terminated: {err}");
        }
    });

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut state = Some(AppState::new(config.user_id, config.display_name()));

    eframe::run_native(
        "Freight Market Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");
            let state = state
                .take()
                .expect("ChatApp should only be initialized once");

            Ok(Box::new(ChatApp::new(
                cc,
                state,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )
}
