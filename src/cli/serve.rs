use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tracing::info;

use photo_relay::config::{default_bind, default_port, Config, ServerConfig};
use photo_relay::server::Server;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "PHOTO_RELAY_BIND", default_value_t = default_bind())]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = default_port())]
    pub port: u16,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = Config::from_env().context("Configuration validation failed")?;
    info!("Loaded configuration for account {}", config.instagram_business_account_id);

    let server = Server::new(
        Arc::new(config),
        ServerConfig {
            bind: args.bind,
            port: args.port,
        },
    );
    server.run().await
}
