//! Notification dispatch module
//!
//! Renders alert decisions and delivers them to the configured channels.
//! Entry and enhancement default to the primary channel, exits to the
//! secondary one; config may override per alert kind.

mod render;
mod telegram;

pub use render::render_alert;
pub use telegram::TelegramNotifier;

use crate::config::{ChannelRole, NotifyConfig};
use crate::signal::AlertKind;
use async_trait::async_trait;

/// Trait for notification dispatcher implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a rendered message to a channel
    async fn send(&self, channel: &str, text: &str) -> anyhow::Result<()>;
}

/// Maps alert kinds to concrete channel identifiers
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    primary: String,
    secondary: String,
    config: crate::config::RoutingConfig,
}

impl ChannelRouter {
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            primary: config.primary_channel.clone(),
            secondary: config.secondary_channel.clone(),
            config: config.routing.clone(),
        }
    }

    /// Logical role an alert kind is routed to
    pub fn role_for(&self, kind: AlertKind) -> ChannelRole {
        let overridden = match kind {
            AlertKind::Entry => self.config.entry,
            AlertKind::Enhancement => self.config.enhancement,
            AlertKind::ExitWarning => self.config.exit_warning,
            AlertKind::ExitFinal => self.config.exit_final,
        };

        overridden.unwrap_or(match kind {
            AlertKind::Entry | AlertKind::Enhancement => ChannelRole::Primary,
            AlertKind::ExitWarning | AlertKind::ExitFinal => ChannelRole::Secondary,
        })
    }

    /// Concrete channel identifier for an alert kind
    pub fn channel_for(&self, kind: AlertKind) -> &str {
        match self.role_for(kind) {
            ChannelRole::Primary => &self.primary,
            ChannelRole::Secondary => &self.secondary,
        }
    }
}
