
use std::fmt;
use thiserror::Error;

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_WEBHOOK_SECRET: &str = "TELEGRAM_WEBHOOK_SECRET";
pub const INSTAGRAM_ACCESS_TOKEN: &str = "INSTAGRAM_ACCESS_TOKEN";
pub const INSTAGRAM_BUSINESS_ACCOUNT_ID: &str = "INSTAGRAM_BUSINESS_ACCOUNT_ID";

/// Every secret the bridge needs, in the order they are reported when missing.
pub const REQUIRED_VARS: [&str; 4] = [
    TELEGRAM_BOT_TOKEN,
    TELEGRAM_WEBHOOK_SECRET,
    INSTAGRAM_ACCESS_TOKEN,
    INSTAGRAM_BUSINESS_ACCOUNT_ID,
];

pub const TELEGRAM_API_BASE_VAR: &str = "TELEGRAM_API_BASE";
pub const GRAPH_API_BASE_VAR: &str = "INSTAGRAM_GRAPH_API_BASE";

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
}

impl ConfigError {
    pub fn missing_keys(&self) -> &[String] {
        match self {
            ConfigError::Missing(keys) => keys,
        }
    }
}

/// Process-wide settings. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_webhook_secret: String,
    pub instagram_access_token: String,
    pub instagram_business_account_id: String,

    /// Telegram Bot API root, without the `/bot<token>` suffix
    pub telegram_api_base: String,

    /// Graph API root including the version segment
    pub graph_api_base: String,
}

// Secrets stay out of logs even when the config is debug-printed.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &mask(&self.telegram_bot_token))
            .field("telegram_webhook_secret", &mask(&self.telegram_webhook_secret))
            .field("instagram_access_token", &mask(&self.instagram_access_token))
            .field(
                "instagram_business_account_id",
                &self.instagram_business_account_id,
            )
            .field("telegram_api_base", &self.telegram_api_base)
            .field("graph_api_base", &self.graph_api_base)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

pub fn default_bind() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load from the process environment.
    ///
    /// `.env.local` and `.env` are read first when present; variables already set in
    /// the environment win over file values.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Absent and empty values are both treated as missing, and every missing key is
    /// reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let telegram_bot_token = required(TELEGRAM_BOT_TOKEN);
        let telegram_webhook_secret = required(TELEGRAM_WEBHOOK_SECRET);
        let instagram_access_token = required(INSTAGRAM_ACCESS_TOKEN);
        let instagram_business_account_id = required(INSTAGRAM_BUSINESS_ACCOUNT_ID);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            telegram_bot_token,
            telegram_webhook_secret,
            instagram_access_token,
            instagram_business_account_id,
            telegram_api_base: base_url(lookup(TELEGRAM_API_BASE_VAR), DEFAULT_TELEGRAM_API_BASE),
            graph_api_base: base_url(lookup(GRAPH_API_BASE_VAR), DEFAULT_GRAPH_API_BASE),
        })
    }

    /// Key/value pairs suitable for printing, with secrets masked.
    pub fn redacted_summary(&self) -> Vec<(&'static str, String)> {
        vec![
            (TELEGRAM_BOT_TOKEN, mask(&self.telegram_bot_token)),
            (TELEGRAM_WEBHOOK_SECRET, mask(&self.telegram_webhook_secret)),
            (INSTAGRAM_ACCESS_TOKEN, mask(&self.instagram_access_token)),
            (
                INSTAGRAM_BUSINESS_ACCOUNT_ID,
                self.instagram_business_account_id.clone(),
            ),
            (TELEGRAM_API_BASE_VAR, self.telegram_api_base.clone()),
            (GRAPH_API_BASE_VAR, self.graph_api_base.clone()),
        ]
    }
}

/// Read `.env.local` then `.env` into the process environment, without overriding
/// variables that are already set.
pub fn load_env_files() {
    for file in [".env.local", ".env"] {
        if dotenvy::from_filename(file).is_ok() {
            tracing::debug!("Loaded environment from {}", file);
        }
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Show only the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
