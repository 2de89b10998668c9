pub mod accumulator;
pub mod pomodoro;

pub use accumulator::{AccumulatorBreakdown, TimeAccumulator};
pub use pomodoro::{AdapterState, SessionAdapter};
