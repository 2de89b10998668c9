use serde::{Deserialize, Serialize};

use crate::models::TimeBreakdown;

/// Totals across every task in a registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatistics {
    pub total_tasks: usize,
    pub active_sessions: usize,
    pub total_focus_time: u64,
    pub total_manual_time: u64,
    pub total_completed_pomodoro_time: u64,
    pub total_incomplete_pomodoro_time: u64,
    pub total_pomodoros: u64,
    pub total_tally_count: u64,
}

impl GlobalStatistics {
    pub fn add(&mut self, breakdown: &TimeBreakdown) {
        self.total_tasks += 1;
        if breakdown.session_active {
            self.active_sessions += 1;
        }
        self.total_focus_time = self.total_focus_time.saturating_add(breakdown.total);
        self.total_manual_time = self.total_manual_time.saturating_add(breakdown.manual_time);
        self.total_completed_pomodoro_time = self
            .total_completed_pomodoro_time
            .saturating_add(breakdown.completed_pomodoro_time);
        self.total_incomplete_pomodoro_time = self
            .total_incomplete_pomodoro_time
            .saturating_add(breakdown.incomplete_pomodoro_time);
        self.total_pomodoros = self.total_pomodoros.saturating_add(breakdown.pomodoro_count);
        self.total_tally_count = self.total_tally_count.saturating_add(breakdown.tally.count);
    }
}

/// Outcome of `TaskRegistry::migrate_all_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub successful: usize,
    pub failed: usize,
    pub report: String,
}
