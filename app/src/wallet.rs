//! Wallet-state conditions for notification templates.

use notify_db::Database;
use notify_scheduler::ConditionRegistry;
use notify_scheduler::defaults::{DASHBOARD_NOT_SAVED, NO_HARDWARE_WALLET};

use crate::config::defaults::{DASHBOARD_SAVED, HARDWARE_WALLET_PAIRED};

/// Conditions backed by wallet flags in the settings table. Each predicate
/// reads the flag when evaluated.
pub fn wallet_conditions(db: &Database) -> ConditionRegistry {
    let mut conditions = ConditionRegistry::new();

    let d = db.clone();
    conditions.register(DASHBOARD_NOT_SAVED, move || !flag_set(&d, DASHBOARD_SAVED));

    let d = db.clone();
    conditions.register(NO_HARDWARE_WALLET, move || {
        !flag_set(&d, HARDWARE_WALLET_PAIRED)
    });

    conditions
}

/// A read failure counts as set, which keeps gated notifications hidden.
fn flag_set(db: &Database, key: &str) -> bool {
    match db.get_setting(key) {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            tracing::warn!("Failed to read {key}: {e}");
            true
        }
    }
}
