pub mod stats;
pub mod task_registry;

pub use stats::{GlobalStatistics, MigrationSummary};
pub use task_registry::TaskRegistry;
