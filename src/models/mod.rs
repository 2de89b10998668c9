mod breakdown;
mod record;
mod session;
mod task;

pub use breakdown::{tally_percentage, TallyProgress, TimeBreakdown, TimeComponents};
pub use record::{FocusTimeRecord, TrackingMode};
pub use session::{ModeSwitch, SessionMode};
pub use task::{LegacyTask, DEFAULT_POMODORO_DURATION_SECS};
