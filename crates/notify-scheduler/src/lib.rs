//! In-app notification scheduling for the wallet dashboard.
//!
//! Decides which single notification is visible at any moment and keeps
//! dismissal state up to date for one-time and repeating templates.

pub mod analytics;
pub mod clock;
pub mod conditions;
pub mod defaults;
pub mod error;
pub mod message;
pub mod rules;
pub mod scheduler;
pub mod store;
pub mod template;

pub use analytics::{AnalyticsSink, NOTIFICATION_CATEGORY, NoopAnalytics, TracingAnalytics};
pub use clock::{Clock, ManualClock, SystemClock};
pub use conditions::ConditionRegistry;
pub use defaults::default_templates;
pub use error::{ConfigurationError, PersistenceError, SchedulerError};
pub use notify_db::{NewNotification, Notification, TemplateData};
pub use scheduler::{NotificationScheduler, SchedulerBuilder};
pub use store::NotificationStore;
pub use template::{NotificationTemplateConfig, TemplateTable};
