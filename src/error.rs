use thiserror::Error;

/// Failures reported by the focus-time components.
///
/// Every variant is a precondition violation: the operation was rejected
/// before any state changed. Benign situations (ending a session that is not
/// running, decrementing an empty tally) are not errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FocusError {
    /// A duration, count or goal was below zero.
    #[error("{field} must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: f64 },

    /// A NaN or infinite value was supplied where seconds are expected.
    #[error("{field} must be a finite number")]
    NonFiniteValue { field: &'static str },

    /// A Pomodoro was started with a target shorter than one second.
    #[error("pomodoro target duration must be positive (got {0})")]
    InvalidTargetDuration(f64),

    /// Legacy counters whose combined seconds do not fit in a `u64`.
    #[error("{field} is too large to convert to focus time")]
    Overflow { field: &'static str },

    /// `complete`/`abort` was called while no Pomodoro was running.
    #[error("no active pomodoro session")]
    NoActivePomodoro,

    /// The registry has no coordinator for this task id.
    #[error("unknown task: {0}")]
    UnknownTask(String),
}

pub type FocusResult<T> = Result<T, FocusError>;
