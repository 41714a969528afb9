//! Persistence collaborator for notification records.

use notify_db::Database;

use crate::error::PersistenceError;
use crate::{NewNotification, Notification};

/// Document store of notifications keyed by UUID.
pub trait NotificationStore {
    fn read_all_notifications(&self) -> Result<Vec<Notification>, PersistenceError>;

    /// Store a new record. The store assigns the UUID.
    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError>;

    fn update_notification(
        &self,
        uuid: &str,
        notification: &Notification,
    ) -> Result<(), PersistenceError>;
}

impl NotificationStore for Database {
    fn read_all_notifications(&self) -> Result<Vec<Notification>, PersistenceError> {
        Database::read_all_notifications(self).map_err(|e| PersistenceError::Read(e.to_string()))
    }

    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError> {
        Database::create_notification(self, notification).map_err(|e| PersistenceError::Create {
            template: notification.template.clone(),
            reason: e.to_string(),
        })
    }

    fn update_notification(
        &self,
        uuid: &str,
        notification: &Notification,
    ) -> Result<(), PersistenceError> {
        Database::update_notification(self, uuid, notification).map_err(|e| {
            PersistenceError::Update {
                uuid: uuid.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
