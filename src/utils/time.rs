use chrono::{DateTime, Utc};

use crate::error::{FocusError, FocusResult};

/// Converts caller-supplied seconds to whole seconds, flooring fractions.
///
/// Negative, non-finite and out-of-range input is rejected rather than
/// clamped.
pub fn whole_seconds(field: &'static str, value: f64) -> FocusResult<u64> {
    if !value.is_finite() {
        return Err(FocusError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(FocusError::NegativeValue { field, value });
    }
    // 2^64: the first float that no longer fits.
    if value >= u64::MAX as f64 {
        return Err(FocusError::Overflow { field });
    }
    Ok(value.floor() as u64)
}

/// Validates a signed count (tally count, goal, pomodoro count).
pub fn non_negative_count(field: &'static str, value: i64) -> FocusResult<u64> {
    u64::try_from(value).map_err(|_| FocusError::NegativeValue {
        field,
        value: value as f64,
    })
}

/// Whole seconds between `start` and `now`; zero if the clock went backwards.
pub fn elapsed_secs(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - start).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        millis as u64 / 1000
    }
}
