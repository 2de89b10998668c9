//! Unified focus-time tracking for tasks.
//!
//! Three tracking styles feed one number per task: a manual stopwatch,
//! Pomodoro sessions (completed ones count their planned length, interrupted
//! ones their elapsed time) and a tally counter kept alongside. Legacy
//! per-task counters are folded in the first time a task is seen.
//!
//! ```no_run
//! use focustime::{models::LegacyTask, TaskRegistry};
//!
//! let registry = TaskRegistry::new();
//! let task = LegacyTask {
//!     id: "write-report".into(),
//!     total_time_seconds: 1800.0,
//!     pomodoro_count: 3,
//!     pomodoro_duration: Some(1500.0),
//!     ..LegacyTask::default()
//! };
//! registry.initialize_task(&task)?;
//! assert_eq!(registry.get_total_focus_time("write-report")?, 6300);
//! # Ok::<(), focustime::FocusError>(())
//! ```

pub mod clock;
pub mod error;
pub mod focus;
pub mod migration;
pub mod models;
pub mod notifications;
pub mod registry;
pub mod settings;
pub mod subscribers;
pub mod tracking;
mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FocusError, FocusResult};
pub use focus::FocusTimeCoordinator;
pub use registry::{GlobalStatistics, MigrationSummary, TaskRegistry};
pub use settings::TrackerSettings;
pub use subscribers::Subscription;

/// Initialises `env_logger` from `RUST_LOG`, defaulting to `info`.
/// Later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
