use serde::{Deserialize, Serialize};

use super::{SessionMode, TrackingMode};

/// Tally counter state as seen by subscribers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TallyProgress {
    pub count: u64,
    pub goal: u64,
    /// Percentage in `0..=100`; zero when no goal is set.
    pub progress: u8,
}

impl TallyProgress {
    pub fn new(count: u64, goal: u64) -> Self {
        Self {
            count,
            goal,
            progress: tally_percentage(count, goal),
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.goal > 0 && self.count >= self.goal
    }
}

pub fn tally_percentage(count: u64, goal: u64) -> u8 {
    if goal == 0 {
        return 0;
    }
    let pct = (count as f64 / goal as f64 * 100.0).round();
    pct.min(100.0) as u8
}

/// Full snapshot of a coordinator, computed against a single instant.
///
/// `total` always equals the sum of the four time parts reported here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeBreakdown {
    pub manual_time: u64,
    pub completed_pomodoro_time: u64,
    pub incomplete_pomodoro_time: u64,
    pub current_session_time: u64,
    pub total: u64,
    pub session_active: bool,
    pub session_mode: Option<SessionMode>,
    pub tracking_mode: TrackingMode,
    pub pomodoro_count: u64,
    pub session_count: u64,
    pub tally: TallyProgress,
}

/// Partial overwrite of a coordinator's counters. Fields left as `None` are
/// untouched. Values are validated before anything is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeComponents {
    pub manual_time: Option<f64>,
    pub completed_pomodoro_time: Option<f64>,
    pub incomplete_pomodoro_time: Option<f64>,
    pub tally_count: Option<i64>,
    pub tally_goal: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_percentage_stays_within_bounds() {
        for goal in 0..12u64 {
            for count in 0..40u64 {
                let pct = tally_percentage(count, goal);
                assert!(pct <= 100, "count={count} goal={goal}");
                if goal == 0 {
                    assert_eq!(pct, 0);
                }
            }
        }
        assert_eq!(tally_percentage(1, 3), 33);
        assert_eq!(tally_percentage(2, 3), 67);
        assert_eq!(tally_percentage(9, 3), 100);
    }

    #[test]
    fn goal_reached_requires_a_goal() {
        assert!(!TallyProgress::new(5, 0).goal_reached());
        assert!(TallyProgress::new(3, 3).goal_reached());
        assert!(!TallyProgress::new(2, 3).goal_reached());
    }
}
