//! Built-in wallet notification templates.

use crate::template::{NotificationTemplateConfig, TemplateTable};

pub const WALLET_CREATED: &str = "wallet-created";
pub const WALLET_ADDED: &str = "wallet-added";
pub const SAVE_DASHBOARD: &str = "save-dashboard";
pub const PRINT_PAPER_WALLET: &str = "print-paper-wallet";
pub const GET_HARDWARE_WALLET: &str = "get-hardware-wallet";

/// Condition: the user has not saved their dashboard yet.
pub const DASHBOARD_NOT_SAVED: &str = "dashboard-not-saved";
/// Condition: no hardware wallet has been paired.
pub const NO_HARDWARE_WALLET: &str = "no-hardware-wallet";

const ONE_DAY_SECS: u64 = 24 * 60 * 60;
const ONE_WEEK_SECS: u64 = 7 * ONE_DAY_SECS;

struct DefaultTemplate {
    name: &'static str,
    dismiss_on_overwrite: bool,
    show_one_time: bool,
    repeat_interval_secs: Option<u64>,
    condition: Option<&'static str>,
    analytics_event: &'static str,
    message: &'static str,
}

const DEFAULT_TEMPLATES: &[DefaultTemplate] = &[
    DefaultTemplate {
        name: WALLET_CREATED,
        dismiss_on_overwrite: true,
        show_one_time: true,
        repeat_interval_secs: None,
        condition: None,
        analytics_event: "New Account (Wallet) Created",
        message: "Your new wallet {address} is ready. Keep your recovery phrase somewhere safe.",
    },
    DefaultTemplate {
        name: WALLET_ADDED,
        dismiss_on_overwrite: true,
        show_one_time: true,
        repeat_interval_secs: None,
        condition: None,
        analytics_event: "Wallet Added",
        message: "{address} was added to your dashboard.",
    },
    DefaultTemplate {
        name: SAVE_DASHBOARD,
        dismiss_on_overwrite: false,
        show_one_time: false,
        repeat_interval_secs: Some(ONE_WEEK_SECS),
        condition: Some(DASHBOARD_NOT_SAVED),
        analytics_event: "Save Your Dashboard",
        message: "Export your dashboard settings so you can restore them on another device.",
    },
    DefaultTemplate {
        name: PRINT_PAPER_WALLET,
        dismiss_on_overwrite: true,
        show_one_time: false,
        repeat_interval_secs: None,
        condition: None,
        analytics_event: "Print Paper Wallet",
        message: "Print a paper wallet for {address} and store it offline.",
    },
    DefaultTemplate {
        name: GET_HARDWARE_WALLET,
        dismiss_on_overwrite: false,
        show_one_time: false,
        repeat_interval_secs: Some(2 * ONE_WEEK_SECS),
        condition: Some(NO_HARDWARE_WALLET),
        analytics_event: "Get Hardware Wallet",
        message: "Protect your funds with a Trezor or Ledger hardware wallet.",
    },
];

/// The template table shipped with the application.
pub fn default_templates() -> TemplateTable {
    let mut table = TemplateTable::new();
    for def in DEFAULT_TEMPLATES {
        let config = NotificationTemplateConfig {
            dismiss_on_overwrite: def.dismiss_on_overwrite,
            show_one_time: def.show_one_time,
            repeat_interval_secs: def.repeat_interval_secs,
            condition: def.condition.map(str::to_string),
            analytics_event: def.analytics_event.to_string(),
            message: Some(def.message.to_string()),
        };
        if let Err(e) = table.insert(def.name, config) {
            tracing::error!("Invalid built-in template {}: {e}", def.name);
        }
    }
    table
}
