use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    error::{FocusError, FocusResult},
    subscribers::invoke_guarded,
    utils::time::elapsed_secs,
};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

type DurationCallback = Box<dyn Fn(u64) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Idle,
    Active {
        started_at: DateTime<Utc>,
        target_secs: u64,
    },
}

/// State machine for a single Pomodoro: `Idle` <-> `Active`.
///
/// Completion always reports the planned target; aborting reports the
/// seconds actually elapsed.
pub struct SessionAdapter {
    clock: Arc<dyn Clock>,
    state: AdapterState,
    completed_count: u64,
    on_complete: Option<DurationCallback>,
    on_abort: Option<DurationCallback>,
}

impl SessionAdapter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: AdapterState::Idle,
            completed_count: 0,
            on_complete: None,
            on_abort: None,
        }
    }

    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn on_abort<F>(&mut self, callback: F)
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.on_abort = Some(Box::new(callback));
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Starts a session of `target_duration` seconds. An active session is
    /// aborted first (its abort callback fires).
    pub fn start_session(&mut self, target_duration: f64) -> FocusResult<()> {
        if !target_duration.is_finite() || target_duration.floor() < 1.0 {
            return Err(FocusError::InvalidTargetDuration(target_duration));
        }
        if self.is_session_active() {
            self.abort_session()?;
        }
        self.state = AdapterState::Active {
            started_at: self.clock.now(),
            target_secs: target_duration.floor() as u64,
        };
        log_debug!("pomodoro started, target {}s", target_duration.floor());
        Ok(())
    }

    /// Completes the active session and returns its target duration.
    pub fn complete_session(&mut self) -> FocusResult<u64> {
        let AdapterState::Active { target_secs, .. } = self.state else {
            return Err(FocusError::NoActivePomodoro);
        };
        self.state = AdapterState::Idle;
        self.completed_count += 1;
        if let Some(callback) = &self.on_complete {
            invoke_guarded("pomodoro complete", || callback(target_secs));
        }
        Ok(target_secs)
    }

    /// Aborts the active session and returns the seconds it ran.
    pub fn abort_session(&mut self) -> FocusResult<u64> {
        let AdapterState::Active { started_at, .. } = self.state else {
            return Err(FocusError::NoActivePomodoro);
        };
        let elapsed = elapsed_secs(started_at, self.clock.now());
        self.state = AdapterState::Idle;
        if let Some(callback) = &self.on_abort {
            invoke_guarded("pomodoro abort", || callback(elapsed));
        }
        Ok(elapsed)
    }

    /// Returns to idle without reporting anything. Used when the owner has
    /// already accounted for the session's time another way.
    pub(crate) fn discard(&mut self) {
        self.state = AdapterState::Idle;
    }

    pub fn is_session_active(&self) -> bool {
        matches!(self.state, AdapterState::Active { .. })
    }

    pub fn target_duration(&self) -> Option<u64> {
        match self.state {
            AdapterState::Active { target_secs, .. } => Some(target_secs),
            AdapterState::Idle => None,
        }
    }

    pub fn get_elapsed_time(&self) -> u64 {
        match self.state {
            AdapterState::Active { started_at, .. } => elapsed_secs(started_at, self.clock.now()),
            AdapterState::Idle => 0,
        }
    }

    pub fn get_remaining_time(&self) -> u64 {
        self.target_duration()
            .map(|target| target.saturating_sub(self.get_elapsed_time()))
            .unwrap_or(0)
    }

    pub fn has_exceeded_target(&self) -> bool {
        self.target_duration()
            .is_some_and(|target| self.get_elapsed_time() > target)
    }

    pub fn get_completed_count(&self) -> u64 {
        self.completed_count
    }
}
