use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{TimeDelta, TimeZone, Utc};
use notify_db::Database;

use super::*;
use crate::clock::ManualClock;
use crate::error::PersistenceError;
use crate::template::NotificationTemplateConfig;
use crate::{NewNotification, TemplateData};

#[derive(Clone, Default)]
struct RecordingAnalytics {
    events: Rc<RefCell<Vec<(String, String)>>>,
}

impl AnalyticsSink for RecordingAnalytics {
    fn track(&self, category: &str, event_label: &str) {
        self.events
            .borrow_mut()
            .push((category.to_string(), event_label.to_string()));
    }
}

/// Store whose reads succeed but whose writes can be switched off.
struct FlakyStore {
    db: Database,
    fail_writes: Rc<Cell<bool>>,
}

impl NotificationStore for FlakyStore {
    fn read_all_notifications(&self) -> Result<Vec<Notification>, PersistenceError> {
        NotificationStore::read_all_notifications(&self.db)
    }

    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Create {
                template: notification.template.clone(),
                reason: "disk full".into(),
            });
        }
        NotificationStore::create_notification(&self.db, notification)
    }

    fn update_notification(
        &self,
        uuid: &str,
        notification: &Notification,
    ) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Update {
                uuid: uuid.to_string(),
                reason: "disk full".into(),
            });
        }
        NotificationStore::update_notification(&self.db, uuid, notification)
    }
}

fn start() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn config(dismiss_on_overwrite: bool, show_one_time: bool) -> NotificationTemplateConfig {
    NotificationTemplateConfig {
        dismiss_on_overwrite,
        show_one_time,
        analytics_event: "Event".into(),
        ..Default::default()
    }
}

fn test_templates() -> TemplateTable {
    let mut t = TemplateTable::new();
    t.insert(
        "overwritable",
        NotificationTemplateConfig {
            analytics_event: "Overwritable".into(),
            message: Some("Added {address}".into()),
            ..config(true, false)
        },
    )
    .unwrap();
    t.insert("plain", config(false, false)).unwrap();
    t.insert("other", config(false, false)).unwrap();
    t.insert("one-time", config(true, true)).unwrap();
    t.insert(
        "hourly",
        NotificationTemplateConfig {
            repeat_interval_secs: Some(3600),
            ..config(false, false)
        },
    )
    .unwrap();
    t.insert(
        "hourly-gated",
        NotificationTemplateConfig {
            repeat_interval_secs: Some(3600),
            condition: Some("gate".into()),
            ..config(false, false)
        },
    )
    .unwrap();
    t
}

struct Harness {
    db: Database,
    clock: ManualClock,
    analytics: RecordingAnalytics,
    gate: Rc<Cell<bool>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            db: Database::open_in_memory().expect("failed to open in-memory db"),
            clock: ManualClock::new(start()),
            analytics: RecordingAnalytics::default(),
            gate: Rc::new(Cell::new(true)),
        }
    }

    fn scheduler(&self) -> NotificationScheduler {
        let mut conditions = ConditionRegistry::new();
        let gate = Rc::clone(&self.gate);
        conditions.register("gate", move || gate.get());

        NotificationScheduler::builder(self.db.clone())
            .templates(test_templates())
            .conditions(conditions)
            .analytics(self.analytics.clone())
            .clock(self.clock.clone())
            .build()
            .expect("failed to build scheduler")
    }

    fn seed(
        &self,
        template: &str,
        displayed_offset: i64,
        dismissed_offset: Option<i64>,
    ) -> Notification {
        self.db
            .create_notification(&NewNotification {
                template: template.into(),
                template_data: None,
                date_displayed: start() + TimeDelta::seconds(displayed_offset),
                dismissed: dismissed_offset.is_some(),
                date_dismissed: dismissed_offset.map(|s| start() + TimeDelta::seconds(s)),
            })
            .expect("failed to seed notification")
    }
}

fn current_template(s: &NotificationScheduler) -> Option<&str> {
    s.current_notification().map(|n| n.template.as_str())
}

#[test]
fn distinct_templates_get_one_record_each() {
    let h = Harness::new();
    let mut s = h.scheduler();

    for template in ["plain", "other", "hourly", "plain", "other"] {
        h.clock.advance(TimeDelta::seconds(1));
        s.display_notification(template, None).unwrap();
    }

    let mut templates: Vec<_> = s.notifications().iter().map(|n| n.template.clone()).collect();
    templates.sort();
    assert_eq!(templates, vec!["hourly", "other", "plain"]);
}

#[test]
fn redisplay_reuses_uuid() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("plain", None).unwrap();
    let first = s.current_notification().unwrap().clone();

    s.dismiss_current_notification().unwrap();
    h.clock.advance(TimeDelta::minutes(5));
    s.display_notification("plain", None).unwrap();

    let second = s.current_notification().unwrap();
    assert_eq!(second.uuid, first.uuid);
    assert!(!second.dismissed);
    assert_eq!(second.date_dismissed, None);
    assert_eq!(second.date_displayed, start() + TimeDelta::minutes(5));
    assert_eq!(s.notifications().len(), 1);
}

#[test]
fn overwrite_dismisses_flagged_notification() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("overwritable", None).unwrap();
    h.clock.advance(TimeDelta::seconds(1));
    s.display_notification("plain", None).unwrap();

    let a = s
        .notifications()
        .iter()
        .find(|n| n.template == "overwritable")
        .unwrap();
    assert!(a.dismissed);
    assert_eq!(a.date_dismissed, Some(start() + TimeDelta::seconds(1)));
    assert_eq!(current_template(&s), Some("plain"));
}

#[test]
fn overwrite_leaves_unflagged_notification_open() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("plain", None).unwrap();
    h.clock.advance(TimeDelta::seconds(1));
    s.display_notification("other", None).unwrap();
    assert_eq!(current_template(&s), Some("other"));

    // "plain" is still open underneath
    s.dismiss_current_notification().unwrap();
    assert_eq!(current_template(&s), Some("plain"));
}

#[test]
fn dismiss_current_is_idempotent() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("overwritable", None).unwrap();
    s.dismiss_current_notification().unwrap();
    let after_first = s.notifications().to_vec();
    assert!(s.current_notification().is_none());

    h.clock.advance(TimeDelta::seconds(30));
    s.dismiss_current_notification().unwrap();
    assert_eq!(s.notifications(), after_first.as_slice());
    assert_eq!(h.db.read_all_notifications().unwrap(), after_first);
}

#[test]
fn dismiss_with_nothing_showing_is_noop() {
    let h = Harness::new();
    let mut s = h.scheduler();
    s.dismiss_current_notification().unwrap();
    assert!(s.notifications().is_empty());
}

#[test]
fn one_time_dismissed_on_first_refresh() {
    let h = Harness::new();
    h.seed("one-time", 0, None);
    h.clock.advance(TimeDelta::seconds(10));

    let s = h.scheduler();
    let n = &s.notifications()[0];
    assert!(n.dismissed);
    assert_eq!(n.date_dismissed, Some(start() + TimeDelta::seconds(10)));
    assert!(s.current_notification().is_none());
}

#[test]
fn one_time_already_dismissed_is_untouched() {
    let h = Harness::new();
    let seeded = h.seed("one-time", 0, Some(5));
    h.clock.advance(TimeDelta::days(30));

    let s = h.scheduler();
    assert_eq!(s.notifications()[0], seeded);
}

#[test]
fn one_time_visible_until_next_refresh() {
    let h = Harness::new();
    let mut s = h.scheduler();
    s.display_notification("one-time", None).unwrap();
    assert_eq!(current_template(&s), Some("one-time"));

    h.clock.advance(TimeDelta::seconds(1));
    s.refresh_notifications().unwrap();
    assert!(s.current_notification().is_none());
}

#[test]
fn repeating_reappears_exactly_at_interval() {
    let h = Harness::new();
    h.seed("hourly", 0, Some(0));

    h.clock.set(start() + TimeDelta::seconds(3599));
    let s = h.scheduler();
    assert!(s.current_notification().is_none());
    assert!(s.notifications()[0].dismissed);

    h.clock.set(start() + TimeDelta::seconds(3600));
    let s = h.scheduler();
    let current = s.current_notification().unwrap();
    assert_eq!(current.template, "hourly");
    assert_eq!(current.date_displayed, start() + TimeDelta::seconds(3600));
    assert_eq!(current.date_dismissed, None);
}

#[test]
fn repeating_waits_for_condition() {
    let h = Harness::new();
    let seeded = h.seed("hourly-gated", 0, Some(0));
    h.clock.set(start() + TimeDelta::hours(2));

    h.gate.set(false);
    let s = h.scheduler();
    assert!(s.current_notification().is_none());
    assert_eq!(s.notifications()[0], seeded);

    h.gate.set(true);
    let s = h.scheduler();
    assert_eq!(current_template(&s), Some("hourly-gated"));
}

#[test]
fn undismissed_repeating_is_left_alone() {
    let h = Harness::new();
    let seeded = h.seed("hourly", 0, None);
    h.clock.set(start() + TimeDelta::days(1));

    let s = h.scheduler();
    assert_eq!(s.notifications()[0], seeded);
    assert_eq!(current_template(&s), Some("hourly"));
}

#[test]
fn fresh_notification_gets_redisplayed_on_refresh() {
    let h = Harness::new();
    h.seed("plain", 0, None);
    h.clock.set(start() + TimeDelta::minutes(10));

    let s = h.scheduler();
    assert_eq!(
        s.current_notification().unwrap().date_displayed,
        start() + TimeDelta::minutes(10)
    );
}

#[test]
fn current_is_latest_displayed_undismissed() {
    let h = Harness::new();
    h.seed("hourly", 50, None);
    h.seed("plain", 100, Some(100));
    h.seed("other", 10, Some(20));

    let s = h.scheduler();
    assert_eq!(current_template(&s), Some("hourly"));
    let latest = s
        .notifications()
        .iter()
        .filter(|n| !n.dismissed)
        .max_by_key(|n| n.date_displayed)
        .map(|n| n.uuid.clone());
    assert_eq!(s.current_notification().map(|n| n.uuid.clone()), latest);
}

#[test]
fn current_follows_displays_under_a_millisecond_apart() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("other", None).unwrap();
    h.clock.advance(TimeDelta::microseconds(100));
    s.display_notification("plain", None).unwrap();
    h.clock.advance(TimeDelta::microseconds(100));
    s.display_notification("other", None).unwrap();

    assert_eq!(current_template(&s), Some("other"));
    assert_eq!(s.notifications().len(), 2);
}

#[test]
fn repeating_waits_out_sub_millisecond_remainder() {
    let h = Harness::new();
    let mut s = h.scheduler();
    h.clock.set(start() + TimeDelta::microseconds(250));
    s.display_notification("hourly", None).unwrap();
    s.dismiss_current_notification().unwrap();

    h.clock
        .set(start() + TimeDelta::hours(1) + TimeDelta::microseconds(249));
    s.refresh_notifications().unwrap();
    assert!(s.current_notification().is_none());

    h.clock.advance(TimeDelta::microseconds(1));
    s.refresh_notifications().unwrap();
    assert_eq!(current_template(&s), Some("hourly"));
}

#[test]
fn in_memory_dates_match_stored_dates() {
    let h = Harness::new();
    let mut s = h.scheduler();
    h.clock.set(start() + TimeDelta::nanoseconds(1_234_567));

    s.display_notification("plain", None).unwrap();

    let shown = s.current_notification().unwrap();
    assert_eq!(shown.date_displayed, start() + TimeDelta::microseconds(1_234));
    assert_eq!(h.db.read_all_notifications().unwrap(), s.notifications());
}

#[test]
fn display_tracks_analytics_event() {
    let h = Harness::new();
    let mut s = h.scheduler();

    s.display_notification("overwritable", None).unwrap();
    s.display_notification("plain", None).unwrap();

    let events = h.analytics.events.borrow();
    assert_eq!(
        *events,
        vec![
            (
                "Notification".to_string(),
                "Overwritable notification displayed".to_string()
            ),
            (
                "Notification".to_string(),
                "Event notification displayed".to_string()
            ),
        ]
    );
}

#[test]
fn unknown_template_is_configuration_error_without_writes() {
    let h = Harness::new();
    let mut s = h.scheduler();
    s.display_notification("overwritable", None).unwrap();

    let err = s.display_notification("no-such-template", None).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Configuration(ConfigurationError::UnknownTemplate(ref t)) if t == "no-such-template"
    ));
    // the overwritable notification was not dismissed
    assert_eq!(current_template(&s), Some("overwritable"));
    assert_eq!(h.analytics.events.borrow().len(), 1);
}

#[test]
fn stored_record_with_unknown_template_fails_build() {
    let h = Harness::new();
    h.seed("removed-template", 0, None);

    let err = NotificationScheduler::builder(h.db.clone())
        .templates(test_templates())
        .conditions({
            let mut c = ConditionRegistry::new();
            c.register("gate", || true);
            c
        })
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        SchedulerError::Configuration(ConfigurationError::UnknownTemplate(_))
    ));
}

#[test]
fn unregistered_condition_fails_build() {
    let h = Harness::new();
    let err = NotificationScheduler::builder(h.db.clone())
        .templates(test_templates())
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        SchedulerError::Configuration(ConfigurationError::UnknownCondition { .. })
    ));
}

#[test]
fn write_failure_propagates_and_keeps_last_view() {
    let db = Database::open_in_memory().unwrap();
    let fail_writes = Rc::new(Cell::new(false));
    let store = FlakyStore {
        db: db.clone(),
        fail_writes: Rc::clone(&fail_writes),
    };

    let mut s = NotificationScheduler::builder(store)
        .templates(test_templates())
        .conditions({
            let mut c = ConditionRegistry::new();
            c.register("gate", || true);
            c
        })
        .analytics(crate::analytics::NoopAnalytics)
        .clock(ManualClock::new(start()))
        .build()
        .unwrap();

    s.display_notification("plain", None).unwrap();
    fail_writes.set(true);

    let err = s.dismiss_current_notification().unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Persistence(PersistenceError::Update { .. })
    ));
    assert_eq!(current_template(&s), Some("plain"));

    let err = s.display_notification("other", None).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Persistence(PersistenceError::Create { .. })
    ));
    assert_eq!(db.read_all_notifications().unwrap().len(), 1);
}

#[test]
fn rendered_message_uses_template_data() {
    let h = Harness::new();
    let mut s = h.scheduler();

    let mut data = TemplateData::new();
    data.insert("address".into(), "0xdeadbeef".into());
    s.display_notification("overwritable", Some(data)).unwrap();

    let current = s.current_notification().unwrap();
    assert_eq!(
        s.rendered_message(current).as_deref(),
        Some("Added 0xdeadbeef")
    );

    s.display_notification("plain", None).unwrap();
    let plain = s.current_notification().unwrap();
    assert_eq!(s.rendered_message(plain), None);
}

#[test]
fn state_survives_restart() {
    let h = Harness::new();
    {
        let mut s = h.scheduler();
        s.display_notification("plain", None).unwrap();
        h.clock.advance(TimeDelta::seconds(1));
        s.display_notification("hourly", None).unwrap();
        s.dismiss_current_notification().unwrap();
    }

    h.clock.advance(TimeDelta::minutes(1));
    let s = h.scheduler();
    assert_eq!(current_template(&s), Some("plain"));
    assert_eq!(s.notifications().len(), 2);
}
