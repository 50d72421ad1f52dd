pub mod config;
pub mod embed;
pub mod webhook;

pub use config::{DeliveryConfig, Destination};
pub use embed::{Embed, EmbedField, EmbedFooter, WebhookPayload, format_alert};
pub use webhook::{DiscordWebhook, HttpTransport, TransportResponse, WebhookTransport};
