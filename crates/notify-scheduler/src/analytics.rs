//! Analytics collaborator. Fire-and-forget.

pub const NOTIFICATION_CATEGORY: &str = "Notification";

pub trait AnalyticsSink {
    fn track(&self, category: &str, event_label: &str);
}

/// Emits analytics events as structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, category: &str, event_label: &str) {
        tracing::info!(category, label = event_label, "analytics event");
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track(&self, _category: &str, _event_label: &str) {}
}

/// Label sent when a notification is shown.
pub(crate) fn displayed_label(analytics_event: &str) -> String {
    format!("{analytics_event} notification displayed")
}
