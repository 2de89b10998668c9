use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    error::{FocusError, FocusResult},
    models::{
        FocusTimeRecord, ModeSwitch, SessionMode, TallyProgress, TimeBreakdown, TimeComponents,
        TrackingMode,
    },
    settings::TrackerSettings,
    subscribers::{Subscribers, Subscription},
    tracking::{SessionAdapter, TimeAccumulator},
    utils::time::{non_negative_count, whole_seconds},
};

use super::{
    state::{SessionState, Tally},
    ticker::Ticker,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Everything a coordinator measures, guarded by one lock.
struct FocusState {
    accumulator: TimeAccumulator,
    completed_pomodoro_time: u64,
    pomodoro_count: u64,
    session_count: u64,
    session: SessionState,
    adapter: SessionAdapter,
    tally: Tally,
    tracking_mode: TrackingMode,
}

impl FocusState {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            accumulator: TimeAccumulator::new(clock.clone()),
            completed_pomodoro_time: 0,
            pomodoro_count: 0,
            session_count: 0,
            session: SessionState::default(),
            adapter: SessionAdapter::new(clock),
            tally: Tally::default(),
            tracking_mode: TrackingMode::default(),
        }
    }

    fn breakdown(&self, now: DateTime<Utc>) -> TimeBreakdown {
        let manual_time = self.accumulator.manual_seconds();
        let incomplete_pomodoro_time = self.accumulator.incomplete_seconds();
        let current_session_time = self.session.elapsed(now);
        TimeBreakdown {
            manual_time,
            completed_pomodoro_time: self.completed_pomodoro_time,
            incomplete_pomodoro_time,
            current_session_time,
            total: manual_time
                .saturating_add(self.completed_pomodoro_time)
                .saturating_add(incomplete_pomodoro_time)
                .saturating_add(current_session_time),
            session_active: self.session.is_active,
            session_mode: self.session.is_active.then_some(self.session.mode),
            tracking_mode: self.tracking_mode,
            pomodoro_count: self.pomodoro_count,
            session_count: self.session_count,
            tally: self.tally.progress(),
        }
    }

    /// Ends the live session, crediting its elapsed time to the bucket for its
    /// mode. Returns the mode and credited seconds, or `None` if idle.
    fn close_session(&mut self, now: DateTime<Utc>) -> Option<(SessionMode, u64)> {
        if !self.session.is_active {
            return None;
        }
        let mode = self.session.mode;
        let elapsed = self.session.elapsed(now);
        match mode {
            SessionMode::Manual => self.accumulator.credit_manual(elapsed),
            SessionMode::Pomodoro => {
                self.accumulator.credit_incomplete(elapsed);
                self.adapter.discard();
            }
        }
        self.session.end();
        self.session_count = self.session_count.saturating_add(1);
        Some((mode, elapsed))
    }

    /// Marks a live pomodoro inactive without crediting its elapsed time.
    fn drop_pomodoro_session(&mut self) -> bool {
        self.adapter.discard();
        if self.session.is_pomodoro() {
            self.session.end();
            true
        } else {
            false
        }
    }
}

struct Inner {
    task_id: String,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    state: Mutex<FocusState>,
    ticker: Mutex<Option<Ticker>>,
    time_subscribers: Arc<Subscribers<TimeBreakdown>>,
    mode_subscribers: Arc<Subscribers<ModeSwitch>>,
    tally_subscribers: Arc<Subscribers<TallyProgress>>,
    goal_subscribers: Arc<Subscribers<TallyProgress>>,
}

/// Single source of truth for one task's focus time.
///
/// Total focus time is `manual + completed pomodoro + incomplete pomodoro`
/// plus the elapsed time of the live session, if any. Cloning is cheap and
/// every clone addresses the same task.
#[derive(Clone)]
pub struct FocusTimeCoordinator {
    inner: Arc<Inner>,
}

impl FocusTimeCoordinator {
    pub fn new(task_id: impl Into<String>, clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        let task_id = task_id.into();
        log_debug!("creating focus coordinator for task {}", task_id);
        Self {
            inner: Arc::new(Inner {
                task_id,
                state: Mutex::new(FocusState::new(clock.clone())),
                clock,
                tick_interval,
                ticker: Mutex::new(None),
                time_subscribers: Subscribers::new("time update"),
                mode_subscribers: Subscribers::new("mode switch"),
                tally_subscribers: Subscribers::new("tally update"),
                goal_subscribers: Subscribers::new("tally goal reached"),
            }),
        }
    }

    pub fn with_settings(
        task_id: impl Into<String>,
        settings: &TrackerSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(task_id, clock, settings.tick_interval())
    }

    pub fn task_id(&self) -> &str {
        &self.inner.task_id
    }

    fn state(&self) -> MutexGuard<'_, FocusState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    // ----- sessions -----

    /// Starts a live session in `mode`, ending any current session first.
    pub fn start_session(&self, mode: SessionMode) {
        self.end_session();
        self.begin_session(mode, None);
    }

    fn begin_session(&self, mode: SessionMode, pomodoro_target: Option<u64>) {
        {
            let now = self.now();
            self.state().session.begin(mode, now, pomodoro_target);
        }
        self.spawn_ticker();
        log_info!(
            "task {}: {} session started",
            self.inner.task_id,
            mode.as_str()
        );
        self.emit_time_update();
    }

    /// Ends the live session and credits its time. No-op when idle.
    pub fn end_session(&self) {
        let closed = {
            let now = self.now();
            self.state().close_session(now)
        };
        let Some((mode, elapsed)) = closed else {
            return;
        };
        self.stop_ticker();
        log_info!(
            "task {}: {} session ended after {}s",
            self.inner.task_id,
            mode.as_str(),
            elapsed
        );
        self.emit_time_update();
    }

    /// Switches the live session to `new_mode`.
    ///
    /// The outgoing session's elapsed time is credited to manual time
    /// whatever its mode was, then the clock restarts in the new mode.
    pub fn switch_mode(&self, new_mode: SessionMode) {
        let switched = {
            let now = self.now();
            let mut state = self.state();
            if !state.session.is_active {
                None
            } else if state.session.mode == new_mode {
                return;
            } else {
                let from = state.session.mode;
                let carried = state.session.elapsed(now);
                state.accumulator.credit_manual(carried);
                if from == SessionMode::Pomodoro {
                    state.adapter.discard();
                }
                state.session.restart(new_mode, now);
                Some(ModeSwitch {
                    from,
                    to: new_mode,
                    carried_seconds: carried,
                })
            }
        };

        let Some(switch) = switched else {
            self.start_session(new_mode);
            return;
        };
        log_info!(
            "task {}: switched {} -> {}, {}s carried to manual time",
            self.inner.task_id,
            switch.from.as_str(),
            switch.to.as_str(),
            switch.carried_seconds
        );
        self.inner.mode_subscribers.emit(&switch);
        self.emit_time_update();
    }

    pub fn is_session_active(&self) -> bool {
        self.state().session.is_active
    }

    pub fn session_mode(&self) -> Option<SessionMode> {
        let state = self.state();
        state.session.is_active.then_some(state.session.mode)
    }

    pub fn session_state(&self) -> SessionState {
        self.state().session
    }

    // ----- pomodoro -----

    /// Starts a Pomodoro of `target_duration` seconds, ending any live
    /// session first.
    pub fn start_pomodoro(&self, target_duration: f64) -> FocusResult<()> {
        if !target_duration.is_finite() || target_duration.floor() < 1.0 {
            return Err(FocusError::InvalidTargetDuration(target_duration));
        }
        self.end_session();
        let target = {
            let mut state = self.state();
            state.adapter.start_session(target_duration)?;
            state.adapter.target_duration()
        };
        self.begin_session(SessionMode::Pomodoro, target);
        Ok(())
    }

    /// Completes the running Pomodoro, crediting its full target duration.
    pub fn complete_pomodoro(&self) -> FocusResult<u64> {
        let target = self.state().adapter.complete_session()?;
        self.handle_pomodoro_complete(target as f64)?;
        Ok(target)
    }

    /// Aborts the running Pomodoro, crediting the seconds it actually ran.
    pub fn abort_pomodoro(&self) -> FocusResult<u64> {
        let elapsed = self.state().adapter.abort_session()?;
        self.handle_pomodoro_incomplete(elapsed as f64)?;
        Ok(elapsed)
    }

    /// Records a finished Pomodoro of `duration` seconds. A live pomodoro
    /// session is closed without measuring it; `duration` is authoritative.
    pub fn handle_pomodoro_complete(&self, duration: f64) -> FocusResult<()> {
        let secs = whole_seconds("duration", duration)?;
        self.record_completed_pomodoros(1, secs);
        Ok(())
    }

    /// Records `count` finished Pomodoros of `duration_secs` each in one
    /// step: the same state as `count` calls to `handle_pomodoro_complete`,
    /// with a single time update. Counters saturate at `u64::MAX`.
    pub fn record_completed_pomodoros(&self, count: u64, duration_secs: u64) {
        if count == 0 {
            return;
        }
        let credited = duration_secs.saturating_mul(count);
        let closed = {
            let mut state = self.state();
            state.completed_pomodoro_time = state.completed_pomodoro_time.saturating_add(credited);
            state.pomodoro_count = state.pomodoro_count.saturating_add(count);
            state.session_count = state.session_count.saturating_add(count);
            state.drop_pomodoro_session()
        };
        if closed {
            self.stop_ticker();
        }
        log_info!(
            "task {}: {} pomodoro(s) completed, {}s credited",
            self.inner.task_id,
            count,
            credited
        );
        self.emit_time_update();
    }

    /// Records an interrupted Pomodoro that ran for `elapsed_time` seconds.
    pub fn handle_pomodoro_incomplete(&self, elapsed_time: f64) -> FocusResult<()> {
        let secs = whole_seconds("elapsedTime", elapsed_time)?;
        let closed = {
            let mut state = self.state();
            state.accumulator.credit_incomplete(secs);
            state.session_count = state.session_count.saturating_add(1);
            state.drop_pomodoro_session()
        };
        if closed {
            self.stop_ticker();
        }
        log_info!(
            "task {}: pomodoro interrupted, {}s credited",
            self.inner.task_id,
            secs
        );
        self.emit_time_update();
        Ok(())
    }

    pub fn pomodoro_remaining(&self) -> u64 {
        self.state().adapter.get_remaining_time()
    }

    pub fn pomodoro_exceeded_target(&self) -> bool {
        self.state().adapter.has_exceeded_target()
    }

    // ----- direct edits -----

    /// Adds manual seconds outside of a live session.
    pub fn add_manual_time(&self, seconds: f64) -> FocusResult<u64> {
        let secs = {
            let mut state = self.state();
            let secs = state.accumulator.add_manual_time(seconds)?;
            if secs > 0 {
                state.session_count = state.session_count.saturating_add(1);
            }
            secs
        };
        self.emit_time_update();
        Ok(secs)
    }

    /// Overwrites the provided components. Nothing is written unless every
    /// provided value is valid.
    pub fn set_time_components(&self, components: TimeComponents) -> FocusResult<()> {
        let manual = components
            .manual_time
            .map(|v| whole_seconds("manualTime", v))
            .transpose()?;
        let completed = components
            .completed_pomodoro_time
            .map(|v| whole_seconds("completedPomodoroTime", v))
            .transpose()?;
        let incomplete = components
            .incomplete_pomodoro_time
            .map(|v| whole_seconds("incompletePomodoroTime", v))
            .transpose()?;
        let tally_count = components
            .tally_count
            .map(|v| non_negative_count("tallyCount", v))
            .transpose()?;
        let tally_goal = components
            .tally_goal
            .map(|v| non_negative_count("tallyGoal", v))
            .transpose()?;

        let tally = {
            let mut state = self.state();
            state.accumulator.set_components(
                manual.map(|v| v as f64),
                incomplete.map(|v| v as f64),
            )?;
            if let Some(completed) = completed {
                state.completed_pomodoro_time = completed;
            }
            if let Some(count) = tally_count {
                state.tally.count = count;
            }
            if let Some(goal) = tally_goal {
                state.tally.goal = goal;
            }
            (tally_count.is_some() || tally_goal.is_some()).then(|| state.tally.progress())
        };

        self.emit_time_update();
        if let Some(progress) = tally {
            self.inner.tally_subscribers.emit(&progress);
        }
        Ok(())
    }

    /// Zeroes every counter and ends the live session without crediting it.
    pub fn reset(&self) {
        {
            let clock = self.inner.clock.clone();
            let mut state = self.state();
            let tracking_mode = state.tracking_mode;
            *state = FocusState::new(clock);
            state.tracking_mode = tracking_mode;
        }
        self.stop_ticker();
        log_info!("task {}: focus time reset", self.inner.task_id);
        self.emit_time_update();
    }

    pub fn tracking_mode(&self) -> TrackingMode {
        self.state().tracking_mode
    }

    pub fn set_tracking_mode(&self, mode: TrackingMode) {
        self.state().tracking_mode = mode;
    }

    // ----- tally -----

    pub fn increment_tally(&self) -> TallyProgress {
        let (progress, reached) = {
            let mut state = self.state();
            let reached = state.tally.increment();
            (state.tally.progress(), reached)
        };
        self.inner.tally_subscribers.emit(&progress);
        if reached {
            log_info!(
                "task {}: tally goal {} reached",
                self.inner.task_id,
                progress.goal
            );
            self.inner.goal_subscribers.emit(&progress);
        }
        progress
    }

    /// Decrements the tally, stopping at zero.
    pub fn decrement_tally(&self) -> TallyProgress {
        let progress = {
            let mut state = self.state();
            state.tally.decrement();
            state.tally.progress()
        };
        self.inner.tally_subscribers.emit(&progress);
        progress
    }

    pub fn set_tally_goal(&self, goal: i64) -> FocusResult<TallyProgress> {
        let goal = non_negative_count("goal", goal)?;
        let progress = {
            let mut state = self.state();
            state.tally.goal = goal;
            state.tally.progress()
        };
        self.inner.tally_subscribers.emit(&progress);
        Ok(progress)
    }

    pub fn get_tally_progress(&self) -> u8 {
        self.state().tally.progress().progress
    }

    pub fn tally(&self) -> TallyProgress {
        self.state().tally.progress()
    }

    // ----- queries -----

    pub fn get_total_focus_time(&self) -> u64 {
        self.get_time_breakdown().total
    }

    pub fn get_time_breakdown(&self) -> TimeBreakdown {
        let now = self.now();
        self.state().breakdown(now)
    }

    /// Snapshot as an at-rest record. `total_focus_time` includes a live
    /// session; the component fields do not.
    pub fn to_record(&self) -> FocusTimeRecord {
        let now = self.now();
        let breakdown = self.state().breakdown(now);
        FocusTimeRecord {
            id: self.inner.task_id.clone(),
            date: now.date_naive(),
            tracking_mode: breakdown.tracking_mode,
            manual_time: breakdown.manual_time,
            completed_pomodoro_time: breakdown.completed_pomodoro_time,
            incomplete_pomodoro_time: breakdown.incomplete_pomodoro_time,
            tally_count: breakdown.tally.count,
            tally_goal: breakdown.tally.goal,
            total_focus_time: breakdown.total,
            pomodoro_count: breakdown.pomodoro_count,
            session_count: breakdown.session_count,
            last_updated: now,
        }
    }

    // ----- subscriptions -----

    pub fn on_time_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TimeBreakdown) + Send + Sync + 'static,
    {
        self.inner.time_subscribers.subscribe(callback)
    }

    pub fn on_mode_switch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ModeSwitch) + Send + Sync + 'static,
    {
        self.inner.mode_subscribers.subscribe(callback)
    }

    pub fn on_tally_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TallyProgress) + Send + Sync + 'static,
    {
        self.inner.tally_subscribers.subscribe(callback)
    }

    pub fn on_tally_goal_reached<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TallyProgress) + Send + Sync + 'static,
    {
        self.inner.goal_subscribers.subscribe(callback)
    }

    /// Stops live updates and drops every subscriber. Time state is kept.
    pub fn dispose(&self) {
        self.stop_ticker();
        self.inner.time_subscribers.clear();
        self.inner.mode_subscribers.clear();
        self.inner.tally_subscribers.clear();
        self.inner.goal_subscribers.clear();
        log_debug!("task {}: coordinator disposed", self.inner.task_id);
    }

    // ----- live updates -----

    fn emit_time_update(&self) {
        let breakdown = self.get_time_breakdown();
        self.inner.time_subscribers.emit(&breakdown);
    }

    fn tick(&self) -> bool {
        let breakdown = {
            let now = self.now();
            let state = self.state();
            if !state.session.is_active {
                return false;
            }
            state.breakdown(now)
        };
        self.inner.time_subscribers.emit(&breakdown);
        true
    }

    fn spawn_ticker(&self) {
        let weak = Arc::downgrade(&self.inner);
        let ticker = Ticker::spawn(self.inner.tick_interval, move || match weak.upgrade() {
            Some(inner) => FocusTimeCoordinator { inner }.tick(),
            None => false,
        });
        if ticker.is_none() {
            log_debug!(
                "task {}: no async runtime, live updates disabled",
                self.inner.task_id
            );
        }
        // Replacing the slot drops (and cancels) any previous ticker.
        *self
            .inner
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = ticker;
    }

    fn stop_ticker(&self) {
        let ticker = self
            .inner
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ticker) = ticker {
            ticker.cancel();
        }
    }

    pub fn has_live_ticker(&self) -> bool {
        self.inner
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
