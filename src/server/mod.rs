pub mod api;

use crate::cli::Args;
use crate::webhook::RelayClient;
use std::error::Error;

pub struct Server {
    addr: String,
    relay: RelayClient,
    args: Args,
}

impl Server {
    pub fn new(addr: String, relay: RelayClient, args: Args) -> Self {
        Self { addr, relay, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.relay.clone(), &self.args).await
    }
}
