//! Command-line front end for the notification scheduler.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use notify_db::Database;
use notify_scheduler::{Notification, NotificationScheduler, TemplateData};
use serde::Serialize;

use crate::bootstrap;
use crate::config::{AppConfig, SettingsManager};

#[derive(Parser, Debug)]
#[command(name = "wallet-notifier", about = "Wallet in-app notification scheduler")]
pub struct Cli {
    /// Print machine-readable JSON instead of text.
    #[clap(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Display a notification for the given template.
    Show {
        template: String,
        /// Template data as key=value, may be repeated.
        #[clap(short, long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Dismiss the notification currently on screen.
    Dismiss,

    /// Print the notification currently on screen.
    Current,

    /// List every stored notification.
    List,

    /// List configured templates.
    Templates,

    /// Print all settings.
    Settings,

    /// Change a setting.
    Set { key: String, value: String },
}

pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[derive(Serialize)]
struct NotificationView<'a> {
    #[serde(flatten)]
    notification: &'a Notification,
    message: Option<String>,
    current: bool,
}

/// Execute one command against the database.
pub fn run(cli: Cli, db: &Database, config: &AppConfig) -> Result<()> {
    let json = cli.json;
    let scheduler = || bootstrap::build_scheduler(db, config);

    match cli.command {
        Command::Show { template, data } => {
            let mut scheduler = scheduler()?;
            let data: Option<TemplateData> = if data.is_empty() {
                None
            } else {
                Some(data.into_iter().collect())
            };
            scheduler.display_notification(&template, data)?;
            print_current(&scheduler, json)?;
        }
        Command::Dismiss => {
            let mut scheduler = scheduler()?;
            scheduler.dismiss_current_notification()?;
            print_current(&scheduler, json)?;
        }
        Command::Current => print_current(&scheduler()?, json)?,
        Command::List => print_list(&scheduler()?, json)?,
        Command::Templates => print_templates(&scheduler()?, json)?,
        Command::Settings => {
            let settings = SettingsManager::new(db.clone()).get_all_settings()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                for s in settings {
                    let marker = if s.is_default { " (default)" } else { "" };
                    println!("{}={}{marker}\n    {}", s.key, s.value, s.description);
                }
            }
        }
        Command::Set { key, value } => {
            SettingsManager::new(db.clone()).set_setting(&key, &value)?;
            println!("{key}={value}");
        }
    }
    Ok(())
}

fn print_list(scheduler: &NotificationScheduler, json: bool) -> Result<()> {
    let current_uuid = scheduler.current_notification().map(|n| n.uuid.as_str());
    let views: Vec<_> = scheduler
        .notifications()
        .iter()
        .map(|n| NotificationView {
            notification: n,
            message: scheduler.rendered_message(n),
            current: current_uuid == Some(n.uuid.as_str()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    if views.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    let now = scheduler.now();
    for v in views {
        let marker = if v.current { "*" } else { " " };
        let state = if v.notification.dismissed { "dismissed" } else { "open" };
        println!(
            "{marker} {:<22} {state:<10} shown {}",
            v.notification.template,
            ago(now, v.notification.date_displayed)
        );
    }
    Ok(())
}

fn print_templates(scheduler: &NotificationScheduler, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(scheduler.templates())?);
        return Ok(());
    }
    for (name, t) in scheduler.templates().iter() {
        let repeat = t
            .repeat_interval()
            .map(|d| format!("every {}s", d.num_seconds()))
            .unwrap_or_else(|| "no repeat".into());
        let condition = t
            .condition
            .as_deref()
            .map(|c| format!(" if {c}"))
            .unwrap_or_default();
        println!(
            "{name:<22} one-time={:<5} overwrite={:<5} {repeat}{condition}",
            t.show_one_time, t.dismiss_on_overwrite
        );
    }
    Ok(())
}

fn print_current(scheduler: &NotificationScheduler, json: bool) -> Result<()> {
    let current = scheduler.current_notification();
    if json {
        let view = current.map(|n| NotificationView {
            notification: n,
            message: scheduler.rendered_message(n),
            current: true,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    match current {
        Some(n) => {
            println!("[{}] {}", n.template, n.uuid);
            if let Some(message) = scheduler.rendered_message(n) {
                println!("{message}");
            }
        }
        None => println!("No notification to show"),
    }
    Ok(())
}

fn ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}
