use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// What to run: `chat` for the terminal client, `relay` for the HTTP relay route.
    #[arg(long, env = "RUN_MODE", default_value = "chat")]
    pub mode: String,

    // --- Webhook Args ---
    /// Automation webhook that receives chat messages and returns the bot reply.
    #[arg(long, env = "WEBHOOK_URL", default_value = "http://localhost:5678/webhook/chat")]
    pub webhook_url: String,

    /// Target the relay route forwards renamed messages to.
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:5678/webhook/relay")]
    pub relay_url: String,

    // --- Session Args ---
    /// File holding the logged-in display name between runs.
    #[arg(long, env = "NAME_STORE_PATH", default_value = ".webhook-chat/session.json")]
    pub name_store_path: String,

    /// Allow sending recorded audio clips.
    #[arg(long, env = "ENABLE_AUDIO", default_value = "true", action = clap::ArgAction::Set)]
    pub enable_audio: bool,

    // --- Relay Server Args ---
    /// Host address and port for the relay server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
