use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a task primarily measures effort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    Tally,
    TimeTracker,
    Pomodoro,
}

impl Default for TrackingMode {
    fn default() -> Self {
        TrackingMode::TimeTracker
    }
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Tally => "tally",
            TrackingMode::TimeTracker => "time_tracker",
            TrackingMode::Pomodoro => "pomodoro",
        }
    }
}

/// At-rest snapshot of a task's focus time. All durations are whole seconds.
///
/// `total_focus_time` equals the sum of the three time components unless the
/// snapshot was taken while a session was live, in which case it also holds
/// the live session's elapsed time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusTimeRecord {
    pub id: String,
    pub date: NaiveDate,
    pub tracking_mode: TrackingMode,
    pub manual_time: u64,
    pub completed_pomodoro_time: u64,
    pub incomplete_pomodoro_time: u64,
    pub tally_count: u64,
    pub tally_goal: u64,
    pub total_focus_time: u64,
    pub pomodoro_count: u64,
    pub session_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl FocusTimeRecord {
    pub fn component_sum(&self) -> u64 {
        self.manual_time
            .saturating_add(self.completed_pomodoro_time)
            .saturating_add(self.incomplete_pomodoro_time)
    }
}
