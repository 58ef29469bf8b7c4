//! Output formatting helpers.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use serde::Serialize;

use ds2admin::{Notification, NotificationKind};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Format an instant in the local timezone.
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a notification, coloured by kind. Errors go to stderr.
pub fn notification(notice: &Notification) {
    match notice.kind {
        NotificationKind::Info => println!("{} {}", "i".blue(), notice.text),
        NotificationKind::Warning => println!("{} {}", "!".yellow(), notice.text.yellow()),
        NotificationKind::Error => error(&notice.text),
    }
}
