pub mod migrator;
pub mod report;

pub use migrator::{
    batch_migrate, detect_tracking_mode, migrate_task_data, resolve_tracking_mode,
    validate_migration, BatchMigration, LegacyCounters, MigrationDiscrepancy, MigrationFailure,
};
pub use report::generate_migration_report;
