use std::time::Duration;

use crate::alert::Integration;

pub const USER_AGENT: &str = "Wazuh-Discord-Integration/1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DASHBOARD_URL: &str = "https://localhost";

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub dashboard_url: String,
    /// Used only when the alert's integration block carries no hook URL.
    pub webhook_url: Option<String>,
}

/// Where this one alert goes, after merging the input with local defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub dashboard_url: String,
    pub webhook_url: Option<String>,
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolve(&self, integration: &Integration) -> Destination {
        let dashboard_url = integration
            .dashboard_url()
            .unwrap_or(&self.dashboard_url)
            .trim_end_matches('/')
            .to_string();

        let webhook_url = integration
            .webhook_url()
            .or(self.webhook_url.as_deref())
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Destination { dashboard_url, webhook_url }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integration(dashboard_url: Option<&str>, api_key: Option<&str>, hook_url: Option<&str>) -> Integration {
        Integration {
            dashboard_url: dashboard_url.map(str::to_string),
            api_key: api_key.map(str::to_string),
            hook_url: hook_url.map(str::to_string),
        }
    }

    #[test]
    fn test_delivery_config_default() {
        let config = DeliveryConfig::default();

        assert_eq!(config.user_agent, "Wazuh-Discord-Integration/1.0");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.dashboard_url, "https://localhost");
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_resolve_prefers_input_document() {
        let config = DeliveryConfig {
            webhook_url: Some("https://fallback/hook".to_string()),
            ..DeliveryConfig::default()
        };

        let destination = config.resolve(&integration(
            Some("https://wazuh.example.com/"),
            None,
            Some("https://discord.com/api/webhooks/1/abc"),
        ));

        assert_eq!(destination.dashboard_url, "https://wazuh.example.com");
        assert_eq!(
            destination.webhook_url.as_deref(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
    }

    #[test]
    fn test_resolve_legacy_api_key_and_fallbacks() {
        let config = DeliveryConfig {
            webhook_url: Some("https://fallback/hook".to_string()),
            ..DeliveryConfig::default()
        };

        let destination = config.resolve(&integration(None, Some("https://legacy.example.com"), None));

        assert_eq!(destination.dashboard_url, "https://legacy.example.com");
        assert_eq!(destination.webhook_url.as_deref(), Some("https://fallback/hook"));
    }

    #[test]
    fn test_resolve_without_any_webhook() {
        let destination = DeliveryConfig::default().resolve(&Integration::default());

        assert_eq!(destination.dashboard_url, "https://localhost");
        assert!(destination.webhook_url.is_none());
    }
}
