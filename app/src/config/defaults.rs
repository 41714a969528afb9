//! All setting definitions with their default values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const ANALYTICS_ENABLED: &str = "ANALYTICS_ENABLED";
pub const NOTIFICATION_TEMPLATES_PATH: &str = "NOTIFICATION_TEMPLATES_PATH";
pub const DASHBOARD_SAVED: &str = "DASHBOARD_SAVED";
pub const HARDWARE_WALLET_PAIRED: &str = "HARDWARE_WALLET_PAIRED";

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    (
        ANALYTICS_ENABLED,
        "true",
        "Report displayed notifications as analytics events",
    ),
    (
        NOTIFICATION_TEMPLATES_PATH,
        "",
        "JSON file with notification templates that extend or replace the built-in ones",
    ),
    (
        DASHBOARD_SAVED,
        "false",
        "Whether the user has exported their dashboard",
    ),
    (
        HARDWARE_WALLET_PAIRED,
        "false",
        "Whether a Trezor or Ledger has been paired",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<BTreeMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
