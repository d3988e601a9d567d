//! Telegram notification dispatcher
//!
//! Delivers rendered alerts via the Bot API `sendMessage` endpoint. The bot
//! token is resolved from the environment, never from the config file.

use super::Notifier;
use crate::config::NotifyConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Client for the Telegram Bot API
pub struct TelegramNotifier {
    base_url: String,
    token: String,
    client: Client,
}

impl TelegramNotifier {
    /// Create a notifier; the bot token is resolved from the environment
    pub fn from_config(config: &NotifyConfig, timeout: Duration) -> anyhow::Result<Self> {
        let token = std::env::var(&config.bot_token_env).map_err(|_| {
            anyhow::anyhow!("missing bot token environment variable {}", config.bot_token_env)
        })?;
        Ok(Self::new(TELEGRAM_API_URL.to_string(), token, timeout))
    }

    /// Create a notifier with an explicit token and base URL
    pub fn new(base_url: String, token: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            token,
            client,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, channel: &str, text: &str) -> anyhow::Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", channel),
                ("text", text),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram send failed: {} - {}", status, body);
        }

        tracing::debug!(channel, "Alert dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_creation() {
        let notifier = TelegramNotifier::new(
            TELEGRAM_API_URL.to_string(),
            "123:abc".to_string(),
            Duration::from_secs(10),
        );
        assert_eq!(notifier.base_url, TELEGRAM_API_URL);
        assert_eq!(notifier.token, "123:abc");
    }

    #[test]
    fn test_from_config_missing_env() {
        let config = NotifyConfig {
            bot_token_env: "LIQRADAR_TEST_UNSET_TOKEN".to_string(),
            primary_channel: "@a".to_string(),
            secondary_channel: "@b".to_string(),
            routing: Default::default(),
        };
        let result = TelegramNotifier::from_config(&config, Duration::from_secs(1));
        assert!(result.is_err());
    }
}
