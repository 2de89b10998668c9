/// Plain-text summary of a migration run.
pub fn generate_migration_report(
    success_count: usize,
    fail_count: usize,
    total_seconds: u64,
) -> String {
    let attempted = success_count + fail_count;
    let success_rate = if attempted == 0 {
        0.0
    } else {
        success_count as f64 / attempted as f64 * 100.0
    };

    format!(
        "Migration Report\n\
         ================\n\
         Successful: {success_count}\n\
         Failed: {fail_count}\n\
         Total focus time: {} minutes\n\
         Success rate: {success_rate:.2}%",
        total_seconds / 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_contains_counts_minutes_and_rate() {
        let report = generate_migration_report(45, 5, 180_000);
        for needle in ["Successful: 45", "Failed: 5", "3000 minutes", "90.00%"] {
            assert!(report.contains(needle), "missing {needle:?} in:\n{report}");
        }
    }

    #[test]
    fn empty_run_reports_zero_rate() {
        let report = generate_migration_report(0, 0, 0);
        assert!(report.contains("0 minutes"));
        assert!(report.contains("0.00%"));
    }

    #[test]
    fn partial_minutes_are_floored() {
        let report = generate_migration_report(1, 2, 179);
        assert!(report.contains("2 minutes"));
        assert!(report.contains("33.33%"));
    }
}
