use anyhow::{Context, Result};
use clap::Args;

use photo_relay::config::Config;
use photo_relay::telegram::TelegramClient;

#[derive(Args)]
pub struct SetWebhookArgs {
    /// Public base URL of this server, e.g. https://relay.example.com
    #[arg(long, env = "PHOTO_RELAY_PUBLIC_URL")]
    pub public_url: String,
}

pub async fn run(args: SetWebhookArgs) -> Result<()> {
    let config = Config::from_env().context("Configuration validation failed")?;
    let url = webhook_url(&args.public_url, &config.telegram_webhook_secret)?;

    let client = TelegramClient::with_api_base(
        config.telegram_bot_token.clone(),
        config.telegram_api_base.clone(),
    );
    client
        .set_webhook(&url)
        .await
        .context("Failed to register Telegram webhook")?;

    println!(
        "Webhook registered: {}/webhook",
        args.public_url.trim_end_matches('/')
    );
    Ok(())
}

fn webhook_url(public_url: &str, secret: &str) -> Result<String> {
    let base = format!("{}/webhook", public_url.trim_end_matches('/'));
    let url = reqwest::Url::parse_with_params(&base, &[("secret", secret)])
        .with_context(|| format!("Invalid public URL: {}", public_url))?;
    Ok(url.into())
}
