use serde::{Deserialize, Serialize};

use super::TrackingMode;

pub const DEFAULT_POMODORO_DURATION_SECS: u64 = 1500;

/// The per-task counters kept by the task store before time tracking was
/// unified. Values are taken as-is from the caller and validated on use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyTask {
    pub id: String,
    #[serde(default)]
    pub total_time_seconds: f64,
    #[serde(default)]
    pub pomodoro_count: i64,
    #[serde(default)]
    pub pomodoro_duration: Option<f64>,
    #[serde(default)]
    pub tally_count: Option<i64>,
    #[serde(default)]
    pub tally_goal: Option<i64>,
    #[serde(default)]
    pub tracking_mode: Option<TrackingMode>,
}

impl LegacyTask {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn pomodoro_duration_or_default(&self) -> f64 {
        self.pomodoro_duration
            .unwrap_or(DEFAULT_POMODORO_DURATION_SECS as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_task_objects() {
        let task: LegacyTask = serde_json::from_str(
            r#"{"id":"t-1","total_time_seconds":1800,"pomodoro_count":3,"tracking_mode":"pomodoro"}"#,
        )
        .unwrap();
        assert_eq!(task.id, "t-1");
        assert_eq!(task.total_time_seconds, 1800.0);
        assert_eq!(task.pomodoro_count, 3);
        assert_eq!(task.tally_count, None);
        assert_eq!(task.tracking_mode, Some(TrackingMode::Pomodoro));
        assert_eq!(task.pomodoro_duration_or_default(), 1500.0);
    }
}
