//! Notification record storage.
//!
//! Records are keyed by a UUID assigned on creation and are never deleted;
//! dismissal is a soft state stored on the row. Dates are stored as
//! microseconds since the epoch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// Values substituted into a template's message.
pub type TemplateData = BTreeMap<String, String>;

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub uuid: String,
    pub template: String,
    pub template_data: Option<TemplateData>,
    pub date_displayed: DateTime<Utc>,
    pub dismissed: bool,
    pub date_dismissed: Option<DateTime<Utc>>,
}

/// A notification that has not been assigned a UUID yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub template: String,
    pub template_data: Option<TemplateData>,
    pub date_displayed: DateTime<Utc>,
    pub dismissed: bool,
    pub date_dismissed: Option<DateTime<Utc>>,
}

impl NewNotification {
    /// Attach an identity, producing a full record.
    pub fn with_uuid(self, uuid: impl Into<String>) -> Notification {
        Notification {
            uuid: uuid.into(),
            template: self.template,
            template_data: self.template_data,
            date_displayed: self.date_displayed,
            dismissed: self.dismissed,
            date_dismissed: self.date_dismissed,
        }
    }
}

struct NotificationRow {
    uuid: String,
    template: String,
    template_data_json: Option<String>,
    date_displayed: i64,
    dismissed: bool,
    date_dismissed: Option<i64>,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification, DbError> {
        let template_data = match self.template_data_json.as_deref() {
            None | Some("") => None,
            Some(json) => Some(serde_json::from_str::<TemplateData>(json).map_err(|e| {
                DbError::InvalidData(format!("template data of {}: {e}", self.uuid))
            })?),
        };
        let date_displayed = from_micros(self.date_displayed, &self.uuid)?;
        let date_dismissed = self
            .date_dismissed
            .map(|us| from_micros(us, &self.uuid))
            .transpose()?;

        Ok(Notification {
            uuid: self.uuid,
            template: self.template,
            template_data,
            date_displayed,
            dismissed: self.dismissed,
            date_dismissed,
        })
    }
}

const SELECT_NOTIFICATION: &str =
    "SELECT uuid, template, template_data_json, date_displayed_us, dismissed, date_dismissed_us
     FROM notifications";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        uuid: row.get(0)?,
        template: row.get(1)?,
        template_data_json: row.get(2)?,
        date_displayed: row.get(3)?,
        dismissed: row.get(4)?,
        date_dismissed: row.get(5)?,
    })
}

fn from_micros(us: i64, uuid: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_micros(us)
        .ok_or_else(|| DbError::InvalidData(format!("timestamp {us} out of range for {uuid}")))
}

fn template_data_json(data: Option<&TemplateData>) -> Result<Option<String>, DbError> {
    data.map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::InvalidData(format!("invalid template data: {e}")))
}

impl Database {
    /// All notifications, oldest display first.
    pub fn read_all_notifications(&self) -> Result<Vec<Notification>, DbError> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_NOTIFICATION} ORDER BY date_displayed_us ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter()
            .map(NotificationRow::into_notification)
            .collect()
    }

    /// Insert a notification under a freshly generated UUID.
    pub fn create_notification(&self, new: &NewNotification) -> Result<Notification, DbError> {
        let notification = new.clone().with_uuid(uuid::Uuid::new_v4().to_string());
        let data_json = template_data_json(notification.template_data.as_ref())?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications
                    (uuid, template, template_data_json, date_displayed_us, dismissed, date_dismissed_us)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    notification.uuid,
                    notification.template,
                    data_json,
                    notification.date_displayed.timestamp_micros(),
                    notification.dismissed,
                    notification.date_dismissed.map(|d| d.timestamp_micros()),
                ],
            )?;
            Ok(())
        })?;
        Ok(notification)
    }

    /// Overwrite every field of the notification stored under `uuid`.
    pub fn update_notification(
        &self,
        uuid: &str,
        notification: &Notification,
    ) -> Result<(), DbError> {
        let data_json = template_data_json(notification.template_data.as_ref())?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications
                 SET template = ?2,
                     template_data_json = ?3,
                     date_displayed_us = ?4,
                     dismissed = ?5,
                     date_dismissed_us = ?6
                 WHERE uuid = ?1",
                rusqlite::params![
                    uuid,
                    notification.template,
                    data_json,
                    notification.date_displayed.timestamp_micros(),
                    notification.dismissed,
                    notification.date_dismissed.map(|d| d.timestamp_micros()),
                ],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("notification {uuid}")));
            }
            Ok(())
        })
    }
}
