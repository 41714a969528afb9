//! SettingsManager: DB-backed settings with defaults, validation, and env migration.

use notify_db::Database;

use super::SettingInfo;
use super::defaults::{DEFAULT_SETTINGS, get_default};
use super::validation::validate_setting;

const SETTING_TYPE: &str = "normal";

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(default) = get_default(key) {
            return Ok(default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;

        self.db.set_setting(key, value, SETTING_TYPE)?;
        Ok(())
    }

    /// Every known setting with its effective value, sorted by key.
    pub fn get_all_settings(&self) -> Result<Vec<SettingInfo>, anyhow::Error> {
        let stored = self.db.get_all_settings()?;
        Ok(DEFAULT_SETTINGS
            .values()
            .map(|def| {
                let value = stored.get(def.key).cloned();
                SettingInfo {
                    key: def.key.to_string(),
                    is_default: value.as_deref().is_none_or(|v| v == def.default),
                    value: value.unwrap_or_else(|| def.default.to_string()),
                    description: def.description.to_string(),
                }
            })
            .collect())
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        let rows: Vec<_> = DEFAULT_SETTINGS
            .values()
            .map(|def| (def.key, def.default, SETTING_TYPE))
            .collect();
        let inserted = self.db.insert_missing_settings(&rows)?;
        if inserted > 0 {
            tracing::info!("Initialized {inserted} default settings");
        }
        Ok(())
    }

    /// Copy settings from the environment into the DB when the DB has none yet.
    pub fn migrate_from_env<F>(&self, env: F) -> Result<u32, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Some(env_val) = env(key).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid {key} from env: {e}");
                continue;
            }
            self.db.set_setting(key, &env_val, SETTING_TYPE)?;
            tracing::info!("Migrated setting from env: {key}");
            migrated += 1;
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }
}
