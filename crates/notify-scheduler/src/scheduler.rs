//! The notification scheduler.
//!
//! Owns the loaded notification list and the current-notification pointer.
//! Every mutation is written through the store and followed by a full reload,
//! so the in-memory view always reflects what was persisted.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use crate::analytics::{AnalyticsSink, NOTIFICATION_CATEGORY, TracingAnalytics, displayed_label};
use crate::clock::{Clock, SystemClock};
use crate::conditions::ConditionRegistry;
use crate::defaults::default_templates;
use crate::error::{ConfigurationError, SchedulerError};
use crate::message;
use crate::rules::{self, RefreshAction};
use crate::store::NotificationStore;
use crate::template::TemplateTable;
use crate::{Notification, TemplateData};

pub struct NotificationScheduler {
    store: Box<dyn NotificationStore>,
    templates: TemplateTable,
    conditions: ConditionRegistry,
    analytics: Box<dyn AnalyticsSink>,
    clock: Box<dyn Clock>,
    notifications: Vec<Notification>,
    current: Option<Notification>,
}

/// Collects collaborators for a [`NotificationScheduler`].
///
/// Defaults: built-in templates, no conditions, analytics to the log,
/// system clock. The built-in templates reference the wallet conditions in
/// [`crate::defaults`], so those must be registered before `build`.
pub struct SchedulerBuilder {
    store: Box<dyn NotificationStore>,
    templates: TemplateTable,
    conditions: ConditionRegistry,
    analytics: Box<dyn AnalyticsSink>,
    clock: Box<dyn Clock>,
}

impl SchedulerBuilder {
    pub fn templates(mut self, templates: TemplateTable) -> Self {
        self.templates = templates;
        self
    }

    pub fn conditions(mut self, conditions: ConditionRegistry) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn analytics(mut self, analytics: impl AnalyticsSink + 'static) -> Self {
        self.analytics = Box::new(analytics);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Validate the template table, load stored notifications and run the
    /// startup refresh pass.
    pub fn build(self) -> Result<NotificationScheduler, SchedulerError> {
        self.templates.validate(&self.conditions)?;

        let mut scheduler = NotificationScheduler {
            store: self.store,
            templates: self.templates,
            conditions: self.conditions,
            analytics: self.analytics,
            clock: self.clock,
            notifications: Vec::new(),
            current: None,
        };
        scheduler.reload()?;
        scheduler.refresh_notifications()?;

        info!(
            total = scheduler.notifications.len(),
            current = scheduler.current.as_ref().map(|n| n.template.as_str()),
            "Notification scheduler ready"
        );
        Ok(scheduler)
    }
}

impl NotificationScheduler {
    pub fn builder(store: impl NotificationStore + 'static) -> SchedulerBuilder {
        SchedulerBuilder {
            store: Box::new(store),
            templates: default_templates(),
            conditions: ConditionRegistry::new(),
            analytics: Box::new(TracingAnalytics),
            clock: Box::new(SystemClock),
        }
    }

    /// The notification that should be on screen, if any.
    pub fn current_notification(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Every stored notification, as of the last reload.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Show `template_name`, dismissing any open notification that yields to
    /// newer ones. Reuses the template's existing record when there is one.
    pub fn display_notification(
        &mut self,
        template_name: &str,
        template_data: Option<TemplateData>,
    ) -> Result<(), SchedulerError> {
        let now = self.now();
        let label = displayed_label(&self.templates.require(template_name)?.analytics_event);

        let overwritten: Vec<Notification> =
            rules::overwrite_targets(&self.notifications, &self.templates)?
                .into_iter()
                .map(|n| rules::dismissed(n, now))
                .collect();
        for notification in &overwritten {
            self.store
                .update_notification(&notification.uuid, notification)?;
            info!(
                template = %notification.template,
                uuid = %notification.uuid,
                "Dismissed notification on overwrite"
            );
        }

        let candidate = rules::candidate(template_name, template_data, now);
        match self
            .notifications
            .iter()
            .find(|n| n.template == template_name)
        {
            Some(existing) => {
                let updated = rules::overwritten(existing, candidate);
                self.store.update_notification(&updated.uuid, &updated)?;
                info!(template = template_name, uuid = %updated.uuid, "Notification displayed again");
            }
            None => {
                let created = self.store.create_notification(&candidate)?;
                info!(template = template_name, uuid = %created.uuid, "Notification created");
            }
        }

        self.analytics.track(NOTIFICATION_CATEGORY, &label);
        self.reload()
    }

    /// Dismiss the current notification. No-op when nothing is showing.
    pub fn dismiss_current_notification(&mut self) -> Result<(), SchedulerError> {
        let Some(current) = &self.current else {
            debug!("No current notification to dismiss");
            return Ok(());
        };

        let dismissed = rules::dismissed(current, self.now());
        self.store.update_notification(&dismissed.uuid, &dismissed)?;
        info!(template = %dismissed.template, uuid = %dismissed.uuid, "Notification dismissed");
        self.reload()
    }

    /// Startup sweep: dismiss one-time notifications and bring back the ones
    /// that are due again.
    ///
    /// Every record is planned before anything is written, so a record with
    /// an unknown template or condition aborts the pass without side effects.
    pub fn refresh_notifications(&mut self) -> Result<(), SchedulerError> {
        let now = self.now();

        let mut updates = Vec::new();
        for notification in &self.notifications {
            let config = self.templates.require(&notification.template)?;
            match rules::refresh_action(notification, config, now) {
                RefreshAction::Keep => {}
                RefreshAction::Dismiss => updates.push(rules::dismissed(notification, now)),
                RefreshAction::Redisplay => {
                    if let Some(condition) = &config.condition {
                        let met = self.conditions.evaluate(condition).ok_or_else(|| {
                            ConfigurationError::UnknownCondition {
                                template: notification.template.clone(),
                                condition: condition.clone(),
                            }
                        })?;
                        if !met {
                            debug!(
                                template = %notification.template,
                                condition = %condition,
                                "Condition not met, leaving notification as is"
                            );
                            continue;
                        }
                    }
                    updates.push(rules::redisplayed(notification, now));
                }
            }
        }

        for notification in &updates {
            self.store
                .update_notification(&notification.uuid, notification)?;
            debug!(
                template = %notification.template,
                dismissed = notification.dismissed,
                "Refreshed notification"
            );
        }
        if !updates.is_empty() {
            info!(updated = updates.len(), "Notification refresh pass applied");
        }

        self.reload()
    }

    /// Message text of `notification` with its template data filled in.
    pub fn rendered_message(&self, notification: &Notification) -> Option<String> {
        let text = self.templates.get(&notification.template)?.message.as_deref()?;
        Some(message::render(text, notification.template_data.as_ref()))
    }

    /// Current time at the store's microsecond precision.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    fn reload(&mut self) -> Result<(), SchedulerError> {
        let notifications = self.store.read_all_notifications()?;
        self.current = rules::current_of(&notifications).cloned();
        self.notifications = notifications;
        Ok(())
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
