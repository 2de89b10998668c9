pub mod coordinator;
pub mod state;
mod ticker;

pub use coordinator::FocusTimeCoordinator;
pub use state::{SessionState, Tally};
