use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ModeSwitch, TallyProgress, TimeBreakdown};

const SUCCESS_DISMISS_MS: u64 = 5000;
const INFO_DISMISS_MS: u64 = 3000;
const WARNING_DISMISS_MS: u64 = 7000;
const MAX_LISTED_ERRORS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    /// Auto-dismiss delay; errors stay until dismissed.
    pub fn default_duration_ms(&self) -> Option<u64> {
        match self {
            NotificationKind::Success => Some(SUCCESS_DISMISS_MS),
            NotificationKind::Info => Some(INFO_DISMISS_MS),
            NotificationKind::Warning => Some(WARNING_DISMISS_MS),
            NotificationKind::Error => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Option<u64>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            duration: kind.default_duration_ms(),
        }
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// "1 hour 5 minutes", "25 minutes", "1 second". Zero parts are left out.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return plural(0, "second");
    }
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;

    [(hours, "hour"), (minutes, "minute"), (secs, "second")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| plural(n, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_time_breakdown(breakdown: &TimeBreakdown) -> String {
    let parts: Vec<String> = [
        ("Manual", breakdown.manual_time),
        ("Pomodoros", breakdown.completed_pomodoro_time),
        ("Partial pomodoros", breakdown.incomplete_pomodoro_time),
        ("Current session", breakdown.current_session_time),
    ]
    .into_iter()
    .filter(|(_, secs)| *secs > 0)
    .map(|(label, secs)| format!("{label}: {}", format_duration(secs)))
    .collect();

    if parts.is_empty() {
        "No focus time recorded yet".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn pomodoro_completed(duration_secs: u64) -> Notification {
    Notification::new(
        NotificationKind::Success,
        "Pomodoro complete",
        format!("Great work! You focused for {}.", format_duration(duration_secs)),
    )
}

pub fn pomodoro_aborted(elapsed_secs: u64) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "Pomodoro stopped",
        format!("{} added as partial focus time.", format_duration(elapsed_secs)),
    )
}

pub fn session_ended(credited_secs: u64, total_secs: u64) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "Session ended",
        format!(
            "{} recorded. Total focus time is now {}.",
            format_duration(credited_secs),
            format_duration(total_secs)
        ),
    )
}

pub fn mode_switched(switch: &ModeSwitch) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "Tracking mode switched",
        format!(
            "Switched from {} to {}; {} kept as manual time.",
            switch.from.as_str(),
            switch.to.as_str(),
            format_duration(switch.carried_seconds)
        ),
    )
}

pub fn tally_goal_reached(progress: &TallyProgress) -> Notification {
    Notification::new(
        NotificationKind::Success,
        "Goal reached",
        format!("You reached your goal of {}!", progress.goal),
    )
}

pub fn time_breakdown(breakdown: &TimeBreakdown) -> Notification {
    Notification::new(
        NotificationKind::Info,
        format!("Total focus time: {}", format_duration(breakdown.total)),
        format_time_breakdown(breakdown),
    )
}

pub fn migration_complete(successful: usize, failed: usize) -> Notification {
    let (kind, title) = if failed == 0 {
        (NotificationKind::Success, "Migration complete")
    } else {
        (NotificationKind::Warning, "Migration finished with errors")
    };
    Notification::new(
        kind,
        title,
        format!(
            "{} migrated, {} failed.",
            plural(successful as u64, "task"),
            failed
        ),
    )
}

pub fn migration_failed(errors: &[String]) -> Notification {
    let mut message = errors
        .iter()
        .take(MAX_LISTED_ERRORS)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if errors.len() > MAX_LISTED_ERRORS {
        message.push_str(&format!(" and {} more", errors.len() - MAX_LISTED_ERRORS));
    }
    if message.is_empty() {
        message = "Unknown migration error".to_string();
    }
    Notification::new(NotificationKind::Error, "Migration failed", message)
}

pub fn error(title: impl Into<String>, message: impl Into<String>) -> Notification {
    Notification::new(NotificationKind::Error, title, message)
}
