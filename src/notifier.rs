use anyhow::Context;
use log::{debug, info};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::alert::Alert;
use crate::clock::Clock;
use crate::discord::{DeliveryConfig, Destination, DiscordWebhook, WebhookPayload, WebhookTransport, format_alert};
use crate::error::NotifyError;

/// Reads the whole alert document from `path`, or from stdin when no path
/// (or "-") is given.
pub async fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    let mut input = String::new();
    match path {
        Some(path) if path.to_str() != Some("-") => {
            let mut file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            file.read_to_string(&mut input).await?;
        }
        _ => {
            tokio::io::stdin().read_to_string(&mut input).await?;
        }
    }
    Ok(input)
}

/// Parses one alert document and builds its Discord payload without sending it.
pub fn prepare(
    input: &str,
    clock: &dyn Clock,
    config: &DeliveryConfig,
) -> Result<(Destination, WebhookPayload), NotifyError> {
    let alert = Alert::from_json(input)?;
    let destination = config.resolve(&alert.integration());
    let summary = alert.summary();

    debug!(
        "Alert rule={} level={} agent={}",
        summary.rule_id, summary.level, summary.agent_id
    );

    let payload = format_alert(&summary, &destination.dashboard_url, clock);
    Ok((destination, payload))
}

/// Handles exactly one alert: parse, format, one POST.
pub async fn run(
    input: &str,
    transport: &dyn WebhookTransport,
    clock: &dyn Clock,
    config: &DeliveryConfig,
) -> Result<(), NotifyError> {
    let (destination, payload) = prepare(input, clock, config)?;

    let webhook_url = destination.webhook_url.ok_or(NotifyError::MissingWebhook)?;

    info!("📤 Sending alert to Discord");
    DiscordWebhook::new(transport, &webhook_url).send(&payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::discord::TransportResponse;
    use crate::error::{ErrorKind, TransportError};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WebhookTransport for CountingTransport {
        async fn post(&self, _url: &str, _body: Vec<u8>) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransportResponse { status: 204, body: None })
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_read_input_from_file() -> anyhow::Result<()> {
        let temp_file = tempfile::NamedTempFile::new()?;
        std::fs::write(temp_file.path(), r#"{"rule":{"id":"1"}}"#)?;

        let input = read_input(Some(temp_file.path())).await?;
        assert_eq!(input, r#"{"rule":{"id":"1"}}"#);

        Ok(())
    }

    #[tokio::test]
    async fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("nonexistent_alert.json"))).await.unwrap_err();
        assert!(err.to_string().contains("nonexistent_alert.json"));
    }

    #[test]
    fn test_prepare_uses_integration_block() -> anyhow::Result<()> {
        let input = r#"{"rule":{"id":"100"},"agent":{"id":"007"},"integration":{"api_key":"https://wazuh.example.com","hook_url":"https://discord.test/hook"}}"#;

        let (destination, payload) = prepare(input, &clock(), &DeliveryConfig::default())?;

        assert_eq!(destination.webhook_url.as_deref(), Some("https://discord.test/hook"));
        let embed = payload.embed().expect("one embed");
        assert_eq!(
            embed.url,
            "https://wazuh.example.com/app/wazuh#/overview/?tab=general&agentId=007"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_run_without_webhook_makes_no_request() {
        let transport = CountingTransport { calls: AtomicUsize::new(0) };

        let err = run("{}", &transport, &clock(), &DeliveryConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_sends_once() -> anyhow::Result<()> {
        let transport = CountingTransport { calls: AtomicUsize::new(0) };
        let input = r#"{"integration":{"hook_url":"https://discord.test/hook"}}"#;

        run(input, &transport, &clock(), &DeliveryConfig::default()).await?;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }
}
