use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::{FocusError, FocusResult},
    models::{FocusTimeRecord, LegacyTask, TrackingMode},
    utils::time::{non_negative_count, whole_seconds},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Legacy counters after validation, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCounters {
    pub time: u64,
    pub pomodoro_count: u64,
    pub pomodoro_duration: u64,
    pub tally_count: u64,
    pub tally_goal: u64,
}

impl LegacyCounters {
    /// Validates every counter and rejects tasks whose converted seconds
    /// would not fit in a `u64`.
    pub fn from_task(task: &LegacyTask) -> FocusResult<Self> {
        let counters = Self {
            time: whole_seconds("total_time_seconds", task.total_time_seconds)?,
            pomodoro_count: non_negative_count("pomodoro_count", task.pomodoro_count)?,
            pomodoro_duration: whole_seconds(
                "pomodoro_duration",
                task.pomodoro_duration_or_default(),
            )?,
            tally_count: non_negative_count("tally_count", task.tally_count.unwrap_or(0))?,
            tally_goal: non_negative_count("tally_goal", task.tally_goal.unwrap_or(0))?,
        };
        counters
            .pomodoro_count
            .checked_mul(counters.pomodoro_duration)
            .and_then(|completed| completed.checked_add(counters.time))
            .ok_or(FocusError::Overflow {
                field: "pomodoro_count",
            })?;
        Ok(counters)
    }

    /// Every historical Pomodoro is assumed to have used the task's current
    /// duration setting.
    pub fn completed_pomodoro_time(&self) -> u64 {
        self.pomodoro_count.saturating_mul(self.pomodoro_duration)
    }

    pub fn total_focus_time(&self) -> u64 {
        self.time.saturating_add(self.completed_pomodoro_time())
    }

    pub fn session_count(&self) -> u64 {
        self.pomodoro_count.saturating_add(u64::from(self.time > 0))
    }
}

/// Picks the mode a legacy task was most likely used in: tally first, then
/// pomodoro, then plain time tracking.
pub fn detect_tracking_mode(task: &LegacyTask) -> TrackingMode {
    if task.tally_count.unwrap_or(0) > 0 {
        TrackingMode::Tally
    } else if task.pomodoro_count > 0 {
        TrackingMode::Pomodoro
    } else {
        TrackingMode::TimeTracker
    }
}

pub fn resolve_tracking_mode(task: &LegacyTask) -> TrackingMode {
    task.tracking_mode
        .unwrap_or_else(|| detect_tracking_mode(task))
}

pub fn migrate_task_data(task: &LegacyTask) -> FocusResult<FocusTimeRecord> {
    let counters = LegacyCounters::from_task(task)?;
    let completed_pomodoro_time = counters.completed_pomodoro_time();
    let now = Utc::now();

    Ok(FocusTimeRecord {
        id: task.id.clone(),
        date: now.date_naive(),
        tracking_mode: resolve_tracking_mode(task),
        manual_time: counters.time,
        completed_pomodoro_time,
        incomplete_pomodoro_time: 0,
        tally_count: counters.tally_count,
        tally_goal: counters.tally_goal,
        total_focus_time: counters.total_focus_time(),
        pomodoro_count: counters.pomodoro_count,
        session_count: counters.session_count(),
        last_updated: now,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub task_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchMigration {
    pub successful: Vec<FocusTimeRecord>,
    pub failed: Vec<MigrationFailure>,
}

impl BatchMigration {
    pub fn total_focus_time(&self) -> u64 {
        self.successful
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.total_focus_time))
    }
}

/// Migrates every task independently. A failing task is recorded in
/// `failed` and the rest still migrate.
pub fn batch_migrate(tasks: &[LegacyTask]) -> BatchMigration {
    let mut batch = BatchMigration::default();
    for task in tasks {
        match migrate_task_data(task) {
            Ok(record) => batch.successful.push(record),
            Err(err) => {
                log_warn!("migration failed for task {}: {}", task.id, err);
                batch.failed.push(MigrationFailure {
                    task_id: task.id.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    log_info!(
        "batch migration finished: {} migrated, {} failed",
        batch.successful.len(),
        batch.failed.len()
    );
    batch
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationDiscrepancy {
    #[error("manual time mismatch: expected {expected}, found {actual}")]
    ManualTimeMismatch { expected: u64, actual: u64 },
    #[error("pomodoro time calculation error: expected {expected}, found {actual}")]
    PomodoroTimeMismatch { expected: u64, actual: u64 },
    #[error("total focus time mismatch: expected {expected}, found {actual}")]
    TotalMismatch { expected: u64, actual: u64 },
}

/// Recomputes a migrated record from its source task and lists every
/// disagreement. An empty list means the record is consistent.
pub fn validate_migration(
    original: &LegacyTask,
    migrated: &FocusTimeRecord,
) -> Vec<MigrationDiscrepancy> {
    let expected_manual = original.total_time_seconds.max(0.0).floor() as u64;
    let expected_pomodoro = (original.pomodoro_count.max(0) as u64)
        .saturating_mul(original.pomodoro_duration_or_default().max(0.0).floor() as u64);
    let expected_total = expected_manual
        .saturating_add(expected_pomodoro)
        .saturating_add(migrated.incomplete_pomodoro_time);

    let mut issues = Vec::new();
    if migrated.manual_time != expected_manual {
        issues.push(MigrationDiscrepancy::ManualTimeMismatch {
            expected: expected_manual,
            actual: migrated.manual_time,
        });
    }
    if migrated.completed_pomodoro_time != expected_pomodoro {
        issues.push(MigrationDiscrepancy::PomodoroTimeMismatch {
            expected: expected_pomodoro,
            actual: migrated.completed_pomodoro_time,
        });
    }
    if migrated.total_focus_time != expected_total {
        issues.push(MigrationDiscrepancy::TotalMismatch {
            expected: expected_total,
            actual: migrated.total_focus_time,
        });
    }
    issues
}
