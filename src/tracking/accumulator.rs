use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    clock::Clock,
    error::FocusResult,
    utils::time::{elapsed_secs, whole_seconds},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatorBreakdown {
    /// Manual seconds including a running stopwatch.
    pub manual_time: u64,
    pub incomplete_pomodoros: u64,
    pub total: u64,
}

/// Stopwatch-style store for manual seconds and partial Pomodoro seconds.
pub struct TimeAccumulator {
    clock: Arc<dyn Clock>,
    manual_seconds: u64,
    incomplete_seconds: u64,
    tracking_started_at: Option<DateTime<Utc>>,
}

impl TimeAccumulator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            manual_seconds: 0,
            incomplete_seconds: 0,
            tracking_started_at: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_started_at.is_some()
    }

    pub fn manual_seconds(&self) -> u64 {
        self.manual_seconds
    }

    pub fn incomplete_seconds(&self) -> u64 {
        self.incomplete_seconds
    }

    fn live_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.tracking_started_at
            .map(|start| elapsed_secs(start, now))
            .unwrap_or(0)
    }

    pub fn get_total_time(&self) -> u64 {
        let now = self.clock.now();
        self.manual_seconds
            .saturating_add(self.incomplete_seconds)
            .saturating_add(self.live_seconds(now))
    }

    /// Starts the stopwatch. A running stopwatch is flushed into manual time
    /// and restarted from now.
    pub fn start_tracking(&mut self) {
        let now = self.clock.now();
        self.flush(now);
        self.tracking_started_at = Some(now);
    }

    /// Stops the stopwatch, crediting elapsed time. No-op when stopped.
    pub fn stop_tracking(&mut self) {
        let now = self.clock.now();
        self.flush(now);
        self.tracking_started_at = None;
    }

    fn flush(&mut self, now: DateTime<Utc>) {
        self.manual_seconds = self.manual_seconds.saturating_add(self.live_seconds(now));
        if self.tracking_started_at.is_some() {
            self.tracking_started_at = Some(now);
        }
    }

    pub fn add_incomplete_session_time(&mut self, seconds: f64) -> FocusResult<u64> {
        let secs = whole_seconds("incompleteSessionTime", seconds)?;
        self.incomplete_seconds = self.incomplete_seconds.saturating_add(secs);
        Ok(secs)
    }

    pub fn add_manual_time(&mut self, seconds: f64) -> FocusResult<u64> {
        let secs = whole_seconds("manualTime", seconds)?;
        self.manual_seconds = self.manual_seconds.saturating_add(secs);
        Ok(secs)
    }

    pub(crate) fn credit_manual(&mut self, secs: u64) {
        self.manual_seconds = self.manual_seconds.saturating_add(secs);
    }

    pub(crate) fn credit_incomplete(&mut self, secs: u64) {
        self.incomplete_seconds = self.incomplete_seconds.saturating_add(secs);
    }

    /// Overwrites the stored components. Both values are validated before
    /// either is written.
    pub fn set_components(
        &mut self,
        manual_time: Option<f64>,
        incomplete_time: Option<f64>,
    ) -> FocusResult<()> {
        let manual = manual_time
            .map(|v| whole_seconds("manualTime", v))
            .transpose()?;
        let incomplete = incomplete_time
            .map(|v| whole_seconds("incompleteTime", v))
            .transpose()?;
        if let Some(manual) = manual {
            self.manual_seconds = manual;
        }
        if let Some(incomplete) = incomplete {
            self.incomplete_seconds = incomplete;
        }
        Ok(())
    }

    pub fn get_time_breakdown(&self) -> AccumulatorBreakdown {
        let now = self.clock.now();
        let manual_time = self.manual_seconds.saturating_add(self.live_seconds(now));
        AccumulatorBreakdown {
            manual_time,
            incomplete_pomodoros: self.incomplete_seconds,
            total: manual_time.saturating_add(self.incomplete_seconds),
        }
    }

    pub fn reset(&mut self) {
        self.manual_seconds = 0;
        self.incomplete_seconds = 0;
        self.tracking_started_at = None;
    }
}
