//! Runtime application configuration loaded from DB + environment overrides.

use std::path::PathBuf;

use super::defaults::{ANALYTICS_ENABLED, NOTIFICATION_TEMPLATES_PATH};
use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub analytics_enabled: bool,
    pub templates_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analytics_enabled: true,
            templates_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        Self::load_with_env(sm, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(sm: &SettingsManager, env: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };

        // ANALYTICS_ENABLED can also be overridden by env
        let analytics_enabled = env(ANALYTICS_ENABLED)
            .map(|v| v == "true")
            .unwrap_or_else(|| g(ANALYTICS_ENABLED) != "false");

        let templates_path = {
            let p = g(NOTIFICATION_TEMPLATES_PATH);
            if p.is_empty() { None } else { Some(PathBuf::from(p)) }
        };

        Ok(Self {
            analytics_enabled,
            templates_path,
        })
    }
}
