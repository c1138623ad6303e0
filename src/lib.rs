pub mod audio;
pub mod cli;
pub mod codec;
pub mod console;
pub mod error;
pub mod models;
pub mod server;
pub mod session;
pub mod store;
pub mod webhook;

use cli::Args;
use log::info;
use server::Server;
use session::{ ChatSession, SessionConfig };
use std::error::Error;
use std::sync::Arc;
use store::FileNameStore;
use webhook::{ HttpWebhookClient, RelayClient };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Run Mode: {}", args.mode);
    info!("Webhook URL: {}", args.webhook_url);
    info!("Relay URL: {}", args.relay_url);
    info!("Name Store Path: {}", args.name_store_path);
    info!("Audio Enabled: {}", args.enable_audio);
    if args.mode == "relay" {
        info!("Server Address: {}", args.server_addr);
        info!("TLS Enabled: {}", args.enable_tls);
    }
    info!("-------------------------");

    match args.mode.to_lowercase().as_str() {
        "chat" => {
            let webhook = Arc::new(HttpWebhookClient::new(args.webhook_url.clone())?);
            let store = Arc::new(FileNameStore::new(&args.name_store_path));
            let session = ChatSession::new(webhook, store, SessionConfig {
                audio_enabled: args.enable_audio,
            });
            console::run(session).await
        }
        "relay" => {
            let relay = RelayClient::new(args.relay_url.clone())?;
            info!("Starting relay server on: {}", args.server_addr);
            let server = Server::new(args.server_addr.clone(), relay, args.clone());
            server.run().await
        }
        other => Err(format!("Unsupported run mode: {}", other).into()),
    }
}
