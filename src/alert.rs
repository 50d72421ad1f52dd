use anyhow::{Context, bail};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::NotifyError;

pub const DEFAULT_RULE_ID: &str = "N/A";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEFAULT_AGENT_FIELD: &str = "N/A";

/// A single Wazuh alert as handed over by integratord.
///
/// Every field is optional. Defaults are applied by [`Alert::summary`], not here.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Alert {
    #[serde(default)]
    pub rule: Option<Rule>,
    #[serde(default)]
    pub agent: Option<AgentInfo>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_log: Option<String>,
    #[serde(default)]
    pub integration: Option<Integration>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Rule {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub mitre: Option<Mitre>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub gdpr: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub pci_dss: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub hipaa: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub nist_800_53: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Mitre {
    #[serde(default, deserialize_with = "lenient_list")]
    pub technique: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub tactic: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AgentInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

/// Destination settings the caller embeds next to the alert.
///
/// `api_key` is where integratord traditionally places the dashboard URL.
/// It is only read as a fallback for `dashboard_url`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Integration {
    #[serde(default, deserialize_with = "lenient_text")]
    pub dashboard_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub api_key: Option<String>,
    #[serde(default, alias = "webhook_url", deserialize_with = "lenient_text")]
    pub hook_url: Option<String>,
}

impl Integration {
    pub fn dashboard_url(&self) -> Option<&str> {
        non_empty(self.dashboard_url.as_deref()).or_else(|| non_empty(self.api_key.as_deref()))
    }

    pub fn webhook_url(&self) -> Option<&str> {
        non_empty(self.hook_url.as_deref())
    }
}

fn non_empty(url: Option<&str>) -> Option<&str> {
    url.filter(|url| !url.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    Gdpr,
    PciDss,
    Hipaa,
    Nist80053,
}

impl Framework {
    /// Scan order used when building the compliance summary.
    pub const ALL: [Framework; 4] = [
        Framework::Gdpr,
        Framework::PciDss,
        Framework::Hipaa,
        Framework::Nist80053,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Framework::Gdpr => "GDPR",
            Framework::PciDss => "PCI DSS",
            Framework::Hipaa => "HIPAA",
            Framework::Nist80053 => "NIST 800-53",
        }
    }

    fn tags<'a>(&self, rule: &'a Rule) -> Option<&'a Vec<String>> {
        match self {
            Framework::Gdpr => rule.gdpr.as_ref(),
            Framework::PciDss => rule.pci_dss.as_ref(),
            Framework::Hipaa => rule.hipaa.as_ref(),
            Framework::Nist80053 => rule.nist_800_53.as_ref(),
        }
    }
}

/// Alert fields with every default resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSummary {
    pub rule_id: String,
    pub level: f64,
    pub description: String,
    pub agent_id: String,
    pub agent_name: String,
    pub timestamp: Option<String>,
    pub full_log: String,
    pub techniques: Vec<String>,
    pub tactics: Vec<String>,
    pub compliance: Vec<(Framework, Vec<String>)>,
}

impl Alert {
    /// Text that is not JSON at all is an input error. JSON of the wrong
    /// shape is reported as unexpected.
    pub fn from_json(input: &str) -> Result<Self, NotifyError> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_value(value)?)
    }

    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        let Value::Object(map) = &value else {
            bail!("alert must be a JSON object, got {}", json_type(&value));
        };
        for key in ["rule", "agent", "integration"] {
            expect_object(map.get(key), key)?;
        }
        if let Some(Value::Object(rule)) = map.get("rule") {
            expect_object(rule.get("mitre"), "rule.mitre")?;
        }

        serde_json::from_value(value).context("alert has an unexpected shape")
    }

    pub fn summary(&self) -> AlertSummary {
        let rule = self.rule.clone().unwrap_or_default();
        let agent = self.agent.clone().unwrap_or_default();
        let mitre = rule.mitre.clone().unwrap_or_default();

        let compliance = Framework::ALL
            .iter()
            .filter_map(|framework| {
                framework
                    .tags(&rule)
                    .map(|tags| (*framework, tags.clone()))
            })
            .collect();

        AlertSummary {
            rule_id: rule.id.unwrap_or_else(|| DEFAULT_RULE_ID.to_string()),
            level: rule.level.unwrap_or(0.0),
            description: rule
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            agent_id: agent.id.unwrap_or_else(|| DEFAULT_AGENT_FIELD.to_string()),
            agent_name: agent
                .name
                .unwrap_or_else(|| DEFAULT_AGENT_FIELD.to_string()),
            timestamp: self.timestamp.clone(),
            full_log: self.full_log.clone().unwrap_or_default(),
            techniques: mitre.technique.unwrap_or_default(),
            tactics: mitre.tactic.unwrap_or_default(),
            compliance,
        }
    }

    pub fn integration(&self) -> Integration {
        self.integration.clone().unwrap_or_default()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Null counts as absent; anything but an object is refused.
fn expect_object(value: Option<&Value>, key: &str) -> anyhow::Result<()> {
    match value {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(other) => bail!("'{}' must be a JSON object, got {}", key, json_type(other)),
    }
}

/// Strings are taken as-is, any other value is rendered as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(other) => Some(display_text(&other)),
    })
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let level = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(level.filter(|l| l.is_finite()))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.iter().map(display_text).collect()),
        Some(other) => Some(vec![display_text(&other)]),
    })
}
