//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    migrate_legacy_tables(conn)?;
    Ok(())
}

fn migrate_legacy_tables(conn: &Connection) -> Result<(), DbError> {
    migrate_notifications_template_data(conn)?;
    migrate_notifications_micros(conn)?;
    Ok(())
}

/// notifications: early builds stored no template data at all
fn migrate_notifications_template_data(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "notifications", "template_data_json")? {
        return Ok(());
    }
    tracing::info!("Adding template_data_json column to notifications");
    conn.execute_batch("ALTER TABLE notifications ADD COLUMN template_data_json TEXT;")?;
    Ok(())
}

/// notifications: millisecond dates (date_displayed, date_dismissed) -> microseconds
fn migrate_notifications_micros(conn: &Connection) -> Result<(), DbError> {
    if !column_exists(conn, "notifications", "date_displayed")? {
        return Ok(());
    }
    tracing::info!("Migrating notification dates to microseconds");
    conn.execute_batch(
        "BEGIN;
         ALTER TABLE notifications RENAME COLUMN date_displayed TO date_displayed_us;
         ALTER TABLE notifications RENAME COLUMN date_dismissed TO date_dismissed_us;
         UPDATE notifications
            SET date_displayed_us = date_displayed_us * 1000,
                date_dismissed_us = date_dismissed_us * 1000;
         COMMIT;",
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    setting_type TEXT NOT NULL DEFAULT 'normal',
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS notifications (
    uuid TEXT PRIMARY KEY,
    template TEXT NOT NULL,
    template_data_json TEXT,
    date_displayed_us INTEGER NOT NULL,
    dismissed BOOLEAN NOT NULL DEFAULT false,
    date_dismissed_us INTEGER
);

CREATE INDEX IF NOT EXISTS idx_notifications_template ON notifications(template);
"#;
