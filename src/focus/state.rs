use chrono::{DateTime, Utc};

use crate::{
    models::{SessionMode, TallyProgress},
    utils::time::elapsed_secs,
};

/// The live session owned by a coordinator. At most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub is_active: bool,
    pub mode: SessionMode,
    pub start_time: Option<DateTime<Utc>>,
    pub pomodoro_target: Option<u64>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_active: false,
            mode: SessionMode::Manual,
            start_time: None,
            pomodoro_target: None,
        }
    }
}

impl SessionState {
    pub fn begin(&mut self, mode: SessionMode, now: DateTime<Utc>, pomodoro_target: Option<u64>) {
        *self = Self {
            is_active: true,
            mode,
            start_time: Some(now),
            pomodoro_target,
        };
    }

    /// Seconds since the session started; zero when inactive.
    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_active, self.start_time) {
            (true, Some(start)) => elapsed_secs(start, now),
            _ => 0,
        }
    }

    /// Restarts the clock in `mode` without ending the session.
    pub fn restart(&mut self, mode: SessionMode, now: DateTime<Utc>) {
        self.mode = mode;
        self.start_time = Some(now);
        self.pomodoro_target = None;
    }

    pub fn end(&mut self) {
        let mode = self.mode;
        *self = Self::default();
        self.mode = mode;
    }

    pub fn is_pomodoro(&self) -> bool {
        self.is_active && self.mode == SessionMode::Pomodoro
    }
}

/// Increment/decrement counter toward an optional goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub count: u64,
    pub goal: u64,
}

impl Tally {
    /// Returns true when this increment reached the goal from below.
    pub fn increment(&mut self) -> bool {
        let before = self.count;
        self.count = self.count.saturating_add(1);
        self.goal > 0 && before < self.goal && self.count >= self.goal
    }

    pub fn decrement(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn progress(&self) -> TallyProgress {
        TallyProgress::new(self.count, self.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_is_zero_once_ended() {
        let now = Utc::now();
        let mut session = SessionState::default();
        session.begin(SessionMode::Pomodoro, now, Some(1500));
        assert_eq!(session.elapsed(now + Duration::seconds(12)), 12);
        assert!(session.is_pomodoro());

        session.end();
        assert_eq!(session.elapsed(now + Duration::seconds(30)), 0);
        assert_eq!(session.mode, SessionMode::Pomodoro);
        assert_eq!(session.pomodoro_target, None);
    }

    #[test]
    fn tally_signals_goal_once_and_clamps_at_zero() {
        let mut tally = Tally { count: 0, goal: 2 };
        assert!(!tally.increment());
        assert!(tally.increment());
        assert!(!tally.increment());

        let mut empty = Tally::default();
        empty.decrement();
        assert_eq!(empty.count, 0);
        assert!(!empty.increment());
    }
}
