//! Per-template display rules.
//!
//! The table is plain data: conditions are referenced by name and resolved
//! against a [`ConditionRegistry`] at scheduling time, so a table can be
//! loaded from JSON and checked in isolation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::conditions::ConditionRegistry;
use crate::error::ConfigurationError;

static RE_TEMPLATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap());

/// Display rules for one notification template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationTemplateConfig {
    /// Dismiss this notification when another one is displayed.
    pub dismiss_on_overwrite: bool,
    /// Dismiss on every refresh pass, so it is seen at most once per display.
    pub show_one_time: bool,
    /// Cooldown after dismissal before the notification may reappear.
    /// Zero means no repeat.
    pub repeat_interval_secs: Option<u64>,
    /// Name of a registered predicate gating re-display.
    pub condition: Option<String>,
    pub analytics_event: String,
    /// Message text; `{key}` placeholders are filled from template data.
    pub message: Option<String>,
}

impl NotificationTemplateConfig {
    pub fn repeat_interval(&self) -> Option<TimeDelta> {
        self.repeat_interval_secs.filter(|&secs| secs > 0).map(|secs| {
            i64::try_from(secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX)
        })
    }
}

/// Template name to display rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateTable {
    templates: BTreeMap<String, NotificationTemplateConfig>,
}

impl TemplateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        config: NotificationTemplateConfig,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        if !RE_TEMPLATE_NAME.is_match(&name) {
            return Err(ConfigurationError::InvalidTemplateName(name));
        }
        self.templates.insert(name, config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NotificationTemplateConfig> {
        self.templates.get(name)
    }

    /// Like [`get`](Self::get), but a missing template is an error.
    pub fn require(&self, name: &str) -> Result<&NotificationTemplateConfig, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownTemplate(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NotificationTemplateConfig)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Parse a JSON object of `name -> config`.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let raw: BTreeMap<String, NotificationTemplateConfig> =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Load(e.to_string()))?;
        let mut table = Self::new();
        for (name, config) in raw {
            table.insert(name, config)?;
        }
        Ok(table)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Overlay `other` on top of this table; templates in `other` win.
    pub fn merge(&mut self, other: TemplateTable) {
        self.templates.extend(other.templates);
    }

    /// Every referenced condition must be registered.
    pub fn validate(&self, conditions: &ConditionRegistry) -> Result<(), ConfigurationError> {
        for (name, config) in &self.templates {
            if let Some(condition) = &config.condition {
                if !conditions.contains(condition) {
                    return Err(ConfigurationError::UnknownCondition {
                        template: name.clone(),
                        condition: condition.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_with_defaults() {
        let table = TemplateTable::from_json(
            r#"{
                "wallet-added": { "dismiss_on_overwrite": true, "show_one_time": true, "analytics_event": "Wallet Added" },
                "save-dashboard": { "repeat_interval_secs": 3600, "condition": "dashboard-not-saved", "analytics_event": "Save Dashboard" }
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let added = table.get("wallet-added").unwrap();
        assert!(added.dismiss_on_overwrite);
        assert!(added.show_one_time);
        assert_eq!(added.repeat_interval(), None);
        assert_eq!(added.message, None);

        let save = table.get("save-dashboard").unwrap();
        assert!(!save.dismiss_on_overwrite);
        assert_eq!(save.repeat_interval(), Some(TimeDelta::hours(1)));
        assert_eq!(save.condition.as_deref(), Some("dashboard-not-saved"));
    }

    #[test]
    fn zero_repeat_interval_means_no_repeat() {
        let table =
            TemplateTable::from_json(r#"{ "nag": { "repeat_interval_secs": 0 } }"#).unwrap();
        assert_eq!(table.get("nag").unwrap().repeat_interval(), None);
    }

    #[test]
    fn rejects_bad_names() {
        let mut table = TemplateTable::new();
        for bad in ["", "Wallet", "9lives", "wallet added", "wallet_added"] {
            let err = table
                .insert(bad, NotificationTemplateConfig::default())
                .unwrap_err();
            assert_eq!(err, ConfigurationError::InvalidTemplateName(bad.to_string()));
        }
        assert!(table.is_empty());

        let err = TemplateTable::from_json(r#"{ "Bad Name": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidTemplateName(_)));
    }

    #[test]
    fn malformed_json_is_load_error() {
        let err = TemplateTable::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Load(_)));
    }

    #[test]
    fn require_reports_unknown_template() {
        let table = TemplateTable::new();
        assert_eq!(
            table.require("missing").unwrap_err(),
            ConfigurationError::UnknownTemplate("missing".into())
        );
    }

    #[test]
    fn merge_overrides_existing() {
        let mut base = TemplateTable::new();
        base.insert(
            "a",
            NotificationTemplateConfig {
                analytics_event: "old".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let mut overlay = TemplateTable::new();
        overlay
            .insert(
                "a",
                NotificationTemplateConfig {
                    analytics_event: "new".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        overlay
            .insert("b", NotificationTemplateConfig::default())
            .unwrap();

        base.merge(overlay);
        assert_eq!(base.len(), 2);
        assert_eq!(base.get("a").unwrap().analytics_event, "new");
    }

    #[test]
    fn validate_requires_registered_conditions() {
        let mut table = TemplateTable::new();
        table
            .insert(
                "gated",
                NotificationTemplateConfig {
                    condition: Some("never-registered".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut conditions = ConditionRegistry::new();
        assert_eq!(
            table.validate(&conditions).unwrap_err(),
            ConfigurationError::UnknownCondition {
                template: "gated".into(),
                condition: "never-registered".into(),
            }
        );

        conditions.register("never-registered", || true);
        table.validate(&conditions).unwrap();
    }
}
