//! Setting value validation.

use super::defaults::{
    ANALYTICS_ENABLED, DASHBOARD_SAVED, HARDWARE_WALLET_PAIRED, NOTIFICATION_TEMPLATES_PATH,
};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        ANALYTICS_ENABLED | DASHBOARD_SAVED | HARDWARE_WALLET_PAIRED => validate_bool(value)?,
        NOTIFICATION_TEMPLATES_PATH => {
            if !value.is_empty() && !value.to_ascii_lowercase().ends_with(".json") {
                return Err("must be empty or a path to a .json file".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_bool(value: &str) -> Result<(), String> {
    if value != "true" && value != "false" {
        return Err("must be 'true' or 'false'".into());
    }
    Ok(())
}
