//! Error types for the notification scheduler.

use thiserror::Error;

/// A failure reported by the notification store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read notifications: {0}")]
    Read(String),

    #[error("failed to create notification for template {template}: {reason}")]
    Create { template: String, reason: String },

    #[error("failed to update notification {uuid}: {reason}")]
    Update { uuid: String, reason: String },
}

/// A template table or template lookup problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no configuration for notification template: {0}")]
    UnknownTemplate(String),

    #[error("template {template} references unregistered condition {condition}")]
    UnknownCondition { template: String, condition: String },

    #[error("invalid template name: {0:?}")]
    InvalidTemplateName(String),

    #[error("failed to load template table: {0}")]
    Load(String),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
