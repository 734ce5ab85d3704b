pub mod config;
pub mod serve;
pub mod webhook;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "photo-relay")]
#[command(author, version, about = "Publish photos sent to a Telegram bot on Instagram")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "pretty",
        env = "PHOTO_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server
    Serve(serve::ServeArgs),

    /// Validate the environment and print the resolved configuration
    CheckConfig,

    /// Register this server's webhook URL with Telegram
    SetWebhook(webhook::SetWebhookArgs),
}
