use serde::{Deserialize, Serialize};

use crate::alert::AlertSummary;
use crate::clock::Clock;

/// Yellow, levels 0..=5.
pub const WARNING_COLOR: u32 = 0xFFFF00;
/// Red, levels above 5.
pub const CRITICAL_COLOR: u32 = 0xFF0000;

pub const LOG_EXCERPT_LIMIT: usize = 900;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

impl WebhookPayload {
    pub fn embed(&self) -> Option<&Embed> {
        self.embeds.first()
    }
}

impl Embed {
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub fn severity_color(level: f64) -> u32 {
    if level <= 5.0 { WARNING_COLOR } else { CRITICAL_COLOR }
}

/// Cuts `log` to [`LOG_EXCERPT_LIMIT`] characters, marking the cut with `...`.
pub fn truncate_log(log: &str) -> String {
    match log.char_indices().nth(LOG_EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}{}", &log[..cut], ELLIPSIS),
        None => log.to_string(),
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{}`", item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the Discord message for one alert. Reads the clock only when the
/// alert has no timestamp of its own.
pub fn format_alert(summary: &AlertSummary, dashboard_url: &str, clock: &dyn Clock) -> WebhookPayload {
    let timestamp = summary
        .timestamp
        .clone()
        .unwrap_or_else(|| clock.iso_timestamp());

    let mut fields = vec![
        EmbedField::new("🔍 Rule ID", format!("`{}`", summary.rule_id), true),
        EmbedField::new("⚠️ Severity Level", format!("`{}`", summary.level), true),
        EmbedField::new(
            "🖥️ Agent",
            format!("`{}` (ID: {})", summary.agent_name, summary.agent_id),
            false,
        ),
    ];

    if !summary.techniques.is_empty() {
        fields.push(EmbedField::new(
            "🎯 MITRE ATT&CK Techniques",
            code_list(&summary.techniques),
            false,
        ));
    }

    if !summary.tactics.is_empty() {
        fields.push(EmbedField::new(
            "🎯 MITRE ATT&CK Tactics",
            code_list(&summary.tactics),
            false,
        ));
    }

    if !summary.compliance.is_empty() {
        let compliance_text = summary
            .compliance
            .iter()
            .map(|(framework, tags)| format!("**{}**: {}", framework.label(), tags.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");
        fields.push(EmbedField::new("📋 Compliance", compliance_text, false));
    }

    if !summary.full_log.is_empty() {
        fields.push(EmbedField::new(
            "📝 Full Log",
            format!("```\n{}\n```", truncate_log(&summary.full_log)),
            false,
        ));
    }

    let embed = Embed {
        title: format!("🚨 {}", summary.description),
        color: severity_color(summary.level),
        fields,
        footer: EmbedFooter {
            text: format!("Wazuh Security Alert • {}", timestamp),
        },
        url: format!(
            "{}/app/wazuh#/overview/?tab=general&agentId={}",
            dashboard_url, summary.agent_id
        ),
    };

    WebhookPayload { embeds: vec![embed] }
}
