//! Pure scheduling rules over notification records.
//!
//! Nothing here touches the store; the scheduler persists whatever these
//! functions produce.

use chrono::{DateTime, Utc};

use crate::error::ConfigurationError;
use crate::template::{NotificationTemplateConfig, TemplateTable};
use crate::{NewNotification, Notification, TemplateData};

/// What a refresh pass does with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    Dismiss,
    /// Show again, subject to the template's condition.
    Redisplay,
    Keep,
}

pub fn dismissed(notification: &Notification, now: DateTime<Utc>) -> Notification {
    Notification {
        dismissed: true,
        date_dismissed: Some(now),
        ..notification.clone()
    }
}

pub fn redisplayed(notification: &Notification, now: DateTime<Utc>) -> Notification {
    Notification {
        dismissed: false,
        date_dismissed: None,
        date_displayed: now,
        ..notification.clone()
    }
}

/// A freshly displayed record for `template`.
pub fn candidate(
    template: &str,
    template_data: Option<TemplateData>,
    now: DateTime<Utc>,
) -> NewNotification {
    NewNotification {
        template: template.to_string(),
        template_data,
        date_displayed: now,
        dismissed: false,
        date_dismissed: None,
    }
}

/// `candidate` stored under the identity of `existing`.
pub fn overwritten(existing: &Notification, candidate: NewNotification) -> Notification {
    candidate.with_uuid(existing.uuid.clone())
}

/// Dismissed, with a repeat interval, and the interval has fully elapsed.
pub fn should_show_repeating(
    notification: &Notification,
    config: &NotificationTemplateConfig,
    now: DateTime<Utc>,
) -> bool {
    let (Some(interval), Some(date_dismissed)) =
        (config.repeat_interval(), notification.date_dismissed)
    else {
        return false;
    };
    notification.dismissed && now.signed_duration_since(date_dismissed) >= interval
}

/// No repeat interval and still undismissed.
pub fn should_show_fresh(notification: &Notification, config: &NotificationTemplateConfig) -> bool {
    config.repeat_interval().is_none() && !notification.dismissed
}

/// One-time records are dismissed once; an already dismissed one is kept
/// so its `date_dismissed` stays at the first dismissal.
pub fn refresh_action(
    notification: &Notification,
    config: &NotificationTemplateConfig,
    now: DateTime<Utc>,
) -> RefreshAction {
    if config.show_one_time {
        return if notification.dismissed {
            RefreshAction::Keep
        } else {
            RefreshAction::Dismiss
        };
    }
    if should_show_repeating(notification, config, now) || should_show_fresh(notification, config)
    {
        RefreshAction::Redisplay
    } else {
        RefreshAction::Keep
    }
}

/// Undismissed records whose template asks to be dismissed when another
/// notification is displayed.
pub fn overwrite_targets<'a>(
    notifications: &'a [Notification],
    templates: &TemplateTable,
) -> Result<Vec<&'a Notification>, ConfigurationError> {
    let mut targets = Vec::new();
    for notification in notifications.iter().filter(|n| !n.dismissed) {
        if templates.require(&notification.template)?.dismiss_on_overwrite {
            targets.push(notification);
        }
    }
    Ok(targets)
}

/// The most recently displayed undismissed record. Ties go to the later
/// record in `notifications`.
pub fn current_of(notifications: &[Notification]) -> Option<&Notification> {
    notifications
        .iter()
        .filter(|n| !n.dismissed)
        .max_by_key(|n| n.date_displayed)
}
