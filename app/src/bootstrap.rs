use std::path::PathBuf;

use anyhow::Context;
use notify_db::Database;
use notify_scheduler::{NoopAnalytics, NotificationScheduler, TemplateTable, TracingAnalytics};

use crate::config::{AppConfig, SettingsManager};
use crate::wallet;

/// Foundation init: env, data directory, database, settings, config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data dir {}", dir.display()))?;

    let db_path = dir.join("local.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let config = init_config(&db)?;
    Ok((db, config, dir))
}

/// Migrate env settings, fill defaults and load the runtime config.
pub fn init_config(db: &Database) -> Result<AppConfig, anyhow::Error> {
    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env(|key| std::env::var(key).ok()) {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;
    tracing::info!(
        analytics = config.analytics_enabled,
        templates = ?config.templates_path,
        "Settings loaded"
    );
    Ok(config)
}

/// Built-in templates, overlaid with the configured template file if any.
pub fn load_templates(config: &AppConfig) -> Result<TemplateTable, anyhow::Error> {
    let mut templates = notify_scheduler::default_templates();
    if let Some(path) = &config.templates_path {
        let overrides = TemplateTable::from_json_file(path)?;
        tracing::info!(
            count = overrides.len(),
            "Loaded notification templates from {}",
            path.display()
        );
        templates.merge(overrides);
    }
    Ok(templates)
}

/// Wire the scheduler to the database and the wallet-state conditions.
pub fn build_scheduler(
    db: &Database,
    config: &AppConfig,
) -> Result<NotificationScheduler, anyhow::Error> {
    let builder = NotificationScheduler::builder(db.clone())
        .templates(load_templates(config)?)
        .conditions(wallet::wallet_conditions(db));

    let builder = if config.analytics_enabled {
        builder.analytics(TracingAnalytics)
    } else {
        builder.analytics(NoopAnalytics)
    };

    Ok(builder.build()?)
}

/// Determine the data directory for the application.
/// Priority: WALLET_NOTIFIER_DATA_DIR env var > ~/.wallet-notifier
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WALLET_NOTIFIER_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wallet-notifier")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
