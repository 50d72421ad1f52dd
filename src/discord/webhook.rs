use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use std::error::Error as StdError;

use super::config::DeliveryConfig;
use super::embed::WebhookPayload;
use crate::error::{NotifyError, TransportError};

/// What came back from the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<String>,
}

/// One JSON POST, no retries.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &DeliveryConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Client(error_chain(&e)))?;

        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.ok();

        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(error_chain(&err))
    } else {
        TransportError::Connect(error_chain(&err))
    }
}

/// Joins an error and its sources into one line, so the root cause
/// (DNS failure, connection refused) is not lost behind reqwest's summary.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub struct DiscordWebhook<'a, T: WebhookTransport + ?Sized> {
    transport: &'a T,
    url: &'a str,
}

impl<'a, T: WebhookTransport + ?Sized> DiscordWebhook<'a, T> {
    pub fn new(transport: &'a T, url: &'a str) -> Self {
        Self { transport, url }
    }

    pub async fn send(&self, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(payload).map_err(|e| NotifyError::Unexpected(e.into()))?;
        debug!("Posting {} byte embed to Discord webhook", body.len());

        let response = self.transport.post(self.url, body).await.map_err(|e| {
            warn!("Discord webhook unreachable: {}", e);
            NotifyError::Transport(e)
        })?;

        // Discord answers 204 No Content on success
        match response.status {
            200 | 204 => {
                info!("Alert delivered to Discord (status {})", response.status);
                Ok(())
            }
            status => {
                let body = response
                    .body
                    .unwrap_or_else(|| "No error body".to_string());
                warn!("Discord webhook rejected alert with status {}", status);
                Err(NotifyError::Http { status, body })
            }
        }
    }
}
