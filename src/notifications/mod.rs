pub mod formatter;

pub use formatter::{format_duration, format_time_breakdown, Notification, NotificationKind};
