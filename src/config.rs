use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

/// Full bot configuration, loaded from a JSON file with environment
/// overrides for the secrets (`JIRA_PASS`, `SLACK_APP_TOKEN`,
/// `SLACK_BOT_TOKEN`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jira: JiraConfig,
    pub slack: SlackConfig,
    /// Jira username -> Slack handle (without the `@`).
    #[serde(default)]
    pub usermap: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional extra path segment between the host and `/browse/`.
    #[serde(default)]
    pub base: Option<String>,
    pub user: String,
    #[serde(default)]
    pub pass: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Display default when the message is not a direct mention.
    #[serde(default)]
    pub response: ResponseMode,
    /// Key of the greenhopper-style sprint custom field, if sprints are used.
    #[serde(default)]
    pub sprint_field: Option<String>,
    /// Dotted field path -> display label for extra attachment fields.
    /// Kept as pairs so the grid renders in the order the file lists them.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub custom_fields: Vec<(String, String)>,
}

fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairVisitor;

    impl<'de> Visitor<'de> for PairVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of field path to display label")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::new();
            while let Some(entry) = map.next_entry()? {
                pairs.push(entry);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairVisitor)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub app_token: Option<String>,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Full,
    #[default]
    Minimal,
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_api_version() -> String {
    "2".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AppError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        let mut config: AppConfig = serde_json::from_str(&contents).map_err(|err| {
            AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
        })?;

        if let Ok(pass) = env::var("JIRA_PASS") {
            config.jira.pass = Some(pass);
        }
        if let Ok(token) = env::var("SLACK_APP_TOKEN") {
            config.slack.app_token = Some(token);
        }
        if let Ok(token) = env::var("SLACK_BOT_TOKEN") {
            config.slack.bot_token = Some(token);
        }

        if config.jira.host.trim().is_empty() {
            return Err(AppError::Configuration(
                "jira.host must not be empty".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let raw = r#"{
            "jira": { "host": "jira.example.com", "user": "bot" },
            "slack": {}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.jira.protocol, "https");
        assert_eq!(config.jira.port, 443);
        assert_eq!(config.jira.response, ResponseMode::Minimal);
        assert!(config.jira.custom_fields.is_empty());
        assert!(config.slack.auto_reconnect);
    }

    #[test]
    fn parses_display_options() {
        let raw = r#"{
            "jira": {
                "host": "jira.example.com",
                "user": "bot",
                "response": "full",
                "sprint_field": "customfield_10016",
                "custom_fields": { "customfield_10001.value": "Team" }
            },
            "slack": { "auto_reconnect": false }
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.jira.response, ResponseMode::Full);
        assert_eq!(config.jira.sprint_field.as_deref(), Some("customfield_10016"));
        assert_eq!(
            config.jira.custom_fields,
            vec![("customfield_10001.value".to_string(), "Team".to_string())]
        );
        assert!(!config.slack.auto_reconnect);
    }

    #[test]
    fn custom_fields_keep_file_order() {
        let raw = r#"{
            "jira": {
                "host": "jira.example.com",
                "user": "bot",
                "custom_fields": {
                    "zeta.value": "Zeta",
                    "alpha.value": "Alpha"
                }
            },
            "slack": {}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(
            config.jira.custom_fields,
            vec![
                ("zeta.value".to_string(), "Zeta".to_string()),
                ("alpha.value".to_string(), "Alpha".to_string()),
            ]
        );
    }
}
