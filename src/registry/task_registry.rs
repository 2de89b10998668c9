use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    clock::{Clock, SystemClock},
    error::{FocusError, FocusResult},
    focus::FocusTimeCoordinator,
    migration::{generate_migration_report, resolve_tracking_mode, validate_migration, LegacyCounters},
    models::{
        FocusTimeRecord, LegacyTask, ModeSwitch, SessionMode, TallyProgress, TimeBreakdown,
        TimeComponents,
    },
    settings::TrackerSettings,
    subscribers::Subscription,
};

use super::stats::{GlobalStatistics, MigrationSummary};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Task-id addressed front door to the per-task coordinators.
///
/// A coordinator is created the first time a task is initialised and its
/// legacy counters are folded in at that point. Construct one registry per
/// application context and pass it where it is needed.
pub struct TaskRegistry {
    settings: TrackerSettings,
    clock: Arc<dyn Clock>,
    coordinators: Mutex<HashMap<String, FocusTimeCoordinator>>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::with_settings(TrackerSettings::default())
    }

    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: TrackerSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            coordinators: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, FocusTimeCoordinator>> {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The coordinator for `task_id`, if the task has been initialised.
    pub fn coordinator(&self, task_id: &str) -> FocusResult<FocusTimeCoordinator> {
        self.map()
            .get(task_id)
            .cloned()
            .ok_or_else(|| FocusError::UnknownTask(task_id.to_string()))
    }

    /// Returns the task's coordinator, creating and migrating it on first use.
    pub fn initialize_task(&self, task: &LegacyTask) -> FocusResult<FocusTimeCoordinator> {
        self.initialize(task).map(|(coordinator, _)| coordinator)
    }

    fn initialize(&self, task: &LegacyTask) -> FocusResult<(FocusTimeCoordinator, bool)> {
        if let Ok(existing) = self.coordinator(&task.id) {
            return Ok((existing, false));
        }

        let counters = LegacyCounters::from_task(task)?;
        let coordinator =
            FocusTimeCoordinator::with_settings(task.id.clone(), &self.settings, self.clock.clone());
        coordinator.set_tracking_mode(resolve_tracking_mode(task));
        coordinator.record_completed_pomodoros(counters.pomodoro_count, counters.pomodoro_duration);
        coordinator.add_manual_time(counters.time as f64)?;
        coordinator.set_time_components(TimeComponents {
            tally_count: Some(counters.tally_count as i64),
            tally_goal: Some(counters.tally_goal as i64),
            ..TimeComponents::default()
        })?;

        let coordinator = self
            .map()
            .entry(task.id.clone())
            .or_insert(coordinator)
            .clone();
        log_info!(
            "initialized task {} ({}s focus time, {} pomodoros)",
            task.id,
            coordinator.get_total_focus_time(),
            counters.pomodoro_count
        );
        Ok((coordinator, true))
    }

    pub fn start_manual_timer(&self, task_id: &str) -> FocusResult<()> {
        self.coordinator(task_id)?.start_session(SessionMode::Manual);
        Ok(())
    }

    /// Starts a Pomodoro; `duration` defaults to the configured length.
    pub fn start_pomodoro(&self, task_id: &str, duration: Option<f64>) -> FocusResult<()> {
        let duration =
            duration.unwrap_or(self.settings.default_pomodoro_duration_secs as f64);
        self.coordinator(task_id)?.start_pomodoro(duration)
    }

    pub fn complete_pomodoro(&self, task_id: &str) -> FocusResult<u64> {
        self.coordinator(task_id)?.complete_pomodoro()
    }

    pub fn abort_pomodoro(&self, task_id: &str) -> FocusResult<u64> {
        self.coordinator(task_id)?.abort_pomodoro()
    }

    pub fn end_session(&self, task_id: &str) -> FocusResult<()> {
        self.coordinator(task_id)?.end_session();
        Ok(())
    }

    pub fn switch_mode(&self, task_id: &str, mode: SessionMode) -> FocusResult<()> {
        self.coordinator(task_id)?.switch_mode(mode);
        Ok(())
    }

    pub fn increment_tally(&self, task_id: &str) -> FocusResult<TallyProgress> {
        Ok(self.coordinator(task_id)?.increment_tally())
    }

    pub fn decrement_tally(&self, task_id: &str) -> FocusResult<TallyProgress> {
        Ok(self.coordinator(task_id)?.decrement_tally())
    }

    pub fn set_tally_goal(&self, task_id: &str, goal: i64) -> FocusResult<TallyProgress> {
        self.coordinator(task_id)?.set_tally_goal(goal)
    }

    pub fn set_time_components(
        &self,
        task_id: &str,
        components: TimeComponents,
    ) -> FocusResult<()> {
        self.coordinator(task_id)?.set_time_components(components)
    }

    pub fn get_total_focus_time(&self, task_id: &str) -> FocusResult<u64> {
        Ok(self.coordinator(task_id)?.get_total_focus_time())
    }

    pub fn get_time_breakdown(&self, task_id: &str) -> FocusResult<TimeBreakdown> {
        Ok(self.coordinator(task_id)?.get_time_breakdown())
    }

    pub fn on_time_update<F>(&self, task_id: &str, callback: F) -> FocusResult<Subscription>
    where
        F: Fn(&TimeBreakdown) + Send + Sync + 'static,
    {
        Ok(self.coordinator(task_id)?.on_time_update(callback))
    }

    pub fn on_mode_switch<F>(&self, task_id: &str, callback: F) -> FocusResult<Subscription>
    where
        F: Fn(&ModeSwitch) + Send + Sync + 'static,
    {
        Ok(self.coordinator(task_id)?.on_mode_switch(callback))
    }

    pub fn on_tally_update<F>(&self, task_id: &str, callback: F) -> FocusResult<Subscription>
    where
        F: Fn(&TallyProgress) + Send + Sync + 'static,
    {
        Ok(self.coordinator(task_id)?.on_tally_update(callback))
    }

    pub fn on_tally_goal_reached<F>(&self, task_id: &str, callback: F) -> FocusResult<Subscription>
    where
        F: Fn(&TallyProgress) + Send + Sync + 'static,
    {
        Ok(self.coordinator(task_id)?.on_tally_goal_reached(callback))
    }

    /// Ends the task's live session, disposes its coordinator and forgets
    /// it. Returns false for unknown ids.
    pub fn cleanup(&self, task_id: &str) -> bool {
        let Some(coordinator) = self.map().remove(task_id) else {
            return false;
        };
        coordinator.end_session();
        coordinator.dispose();
        log_info!("cleaned up task {}", task_id);
        true
    }

    pub fn cleanup_all(&self) {
        let drained: Vec<FocusTimeCoordinator> =
            self.map().drain().map(|(_, coordinator)| coordinator).collect();
        for coordinator in &drained {
            coordinator.end_session();
            coordinator.dispose();
        }
        log_info!("cleaned up {} task(s)", drained.len());
    }

    /// Initialises every task, counting failures instead of stopping at them.
    pub fn migrate_all_tasks(&self, tasks: &[LegacyTask]) -> MigrationSummary {
        let mut successful = 0;
        let mut failed = 0;
        let mut total_seconds = 0;

        for task in tasks {
            match self.initialize(task) {
                Ok((coordinator, created)) => {
                    successful += 1;
                    total_seconds += coordinator.get_total_focus_time();
                    if created {
                        for issue in validate_migration(task, &coordinator.to_record()) {
                            log_warn!("task {}: {}", task.id, issue);
                        }
                    }
                }
                Err(err) => {
                    failed += 1;
                    log_warn!("migration failed for task {}: {}", task.id, err);
                }
            }
        }

        MigrationSummary {
            successful,
            failed,
            report: generate_migration_report(successful, failed, total_seconds),
        }
    }

    pub fn export_task_data(&self, task_id: &str) -> Option<FocusTimeRecord> {
        self.coordinator(task_id).ok().map(|c| c.to_record())
    }

    pub fn get_global_statistics(&self) -> GlobalStatistics {
        let coordinators: Vec<FocusTimeCoordinator> = self.map().values().cloned().collect();
        let mut stats = GlobalStatistics::default();
        for coordinator in &coordinators {
            stats.add(&coordinator.get_time_breakdown());
        }
        stats
    }

    pub fn task_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.map().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
