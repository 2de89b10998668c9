use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use focustime::{
    migration::{batch_migrate, generate_migration_report, migrate_task_data},
    models::{LegacyTask, SessionMode, TimeComponents, TrackingMode},
    notifications::{formatter, NotificationKind},
    FocusError, FocusTimeCoordinator, ManualClock, TaskRegistry, TrackerSettings,
};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn registry() -> (Arc<ManualClock>, TaskRegistry) {
    init();
    let clock = Arc::new(ManualClock::default());
    (
        clock.clone(),
        TaskRegistry::with_clock(TrackerSettings::default(), clock),
    )
}

fn task(id: &str, time: f64, pomodoros: i64, duration: f64) -> LegacyTask {
    LegacyTask {
        id: id.to_string(),
        total_time_seconds: time,
        pomodoro_count: pomodoros,
        pomodoro_duration: Some(duration),
        ..LegacyTask::default()
    }
}

#[test]
fn legacy_task_migrates_to_6300_seconds() {
    let record = migrate_task_data(&task("t", 1800.0, 3, 1500.0)).unwrap();
    assert_eq!(record.total_focus_time, 6300);
    assert_eq!(record.session_count, 4);

    let (_, registry) = registry();
    registry
        .initialize_task(&task("t", 1800.0, 3, 1500.0))
        .unwrap();
    let exported = registry.export_task_data("t").unwrap();
    assert_eq!(exported.total_focus_time, 6300);
    assert_eq!(exported.session_count, 4);
}

#[test]
fn batch_with_one_malformed_task_keeps_the_rest() {
    let mut tasks: Vec<LegacyTask> = (0..10)
        .map(|k| task(&format!("t{k}"), 60.0, k, 1500.0))
        .collect();
    tasks[4].pomodoro_duration = Some(-25.0);

    let batch = batch_migrate(&tasks);
    assert_eq!(batch.successful.len(), 9);
    assert_eq!(batch.failed.len(), 1);

    let notice = formatter::migration_failed(
        &batch
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.task_id, f.error))
            .collect::<Vec<_>>(),
    );
    assert_eq!(notice.kind, NotificationKind::Error);
    assert!(notice.message.starts_with("t4:"));
}

#[test]
fn report_matches_expected_text() {
    let report = generate_migration_report(45, 5, 180_000);
    assert!(report.contains("Successful: 45"));
    assert!(report.contains("Failed: 5"));
    assert!(report.contains("3000 minutes"));
    assert!(report.contains("90.00%"));
}

#[test]
fn tally_goal_fires_once_after_third_increment() {
    let (_, registry) = registry();
    registry.initialize_task(&LegacyTask::new("tally")).unwrap();
    registry.set_tally_goal("tally", 3).unwrap();

    let fired_at = Arc::new(Mutex::new(Vec::new()));
    let sink = fired_at.clone();
    let _sub = registry
        .on_tally_goal_reached("tally", move |p| sink.lock().unwrap().push(p.count))
        .unwrap();

    for _ in 0..3 {
        registry.increment_tally("tally").unwrap();
    }
    assert_eq!(*fired_at.lock().unwrap(), vec![3]);

    registry.decrement_tally("tally").unwrap();
    registry.increment_tally("tally").unwrap();
    assert_eq!(*fired_at.lock().unwrap(), vec![3, 3]);
}

#[test]
fn manual_then_pomodoro_switch_never_loses_time() {
    let (clock, registry) = registry();
    registry.initialize_task(&LegacyTask::new("t")).unwrap();
    registry.start_manual_timer("t").unwrap();
    clock.advance_secs(300);

    let before = registry.get_total_focus_time("t").unwrap();
    registry.switch_mode("t", SessionMode::Pomodoro).unwrap();
    assert_eq!(registry.get_total_focus_time("t").unwrap(), before);

    clock.advance_secs(45);
    registry.end_session("t").unwrap();
    let after = registry.get_total_focus_time("t").unwrap();
    assert!(after >= before);
    assert_eq!(after, 345);
}

#[test]
fn pomodoro_switched_to_manual_is_credited_as_manual() {
    let (clock, registry) = registry();
    registry.initialize_task(&LegacyTask::new("t")).unwrap();
    registry.start_pomodoro("t", Some(1500.0)).unwrap();
    clock.advance_secs(100);
    registry.switch_mode("t", SessionMode::Manual).unwrap();
    clock.advance_secs(50);
    registry.switch_mode("t", SessionMode::Pomodoro).unwrap();
    clock.advance_secs(25);
    registry.end_session("t").unwrap();

    let breakdown = registry.get_time_breakdown("t").unwrap();
    assert_eq!(breakdown.manual_time, 150);
    assert_eq!(breakdown.incomplete_pomodoro_time, 25);
    assert_eq!(breakdown.total, 175);
}

#[test]
fn precondition_errors_and_benign_no_ops_differ() {
    let (_, registry) = registry();
    registry.initialize_task(&LegacyTask::new("t")).unwrap();

    assert_eq!(
        registry.complete_pomodoro("t"),
        Err(FocusError::NoActivePomodoro)
    );
    assert_eq!(
        registry.abort_pomodoro("t"),
        Err(FocusError::NoActivePomodoro)
    );
    assert!(matches!(
        registry.start_pomodoro("t", Some(0.0)),
        Err(FocusError::InvalidTargetDuration(_))
    ));
    assert!(registry.set_tally_goal("t", -1).is_err());
    assert!(registry
        .set_time_components(
            "t",
            TimeComponents {
                completed_pomodoro_time: Some(-1.0),
                ..TimeComponents::default()
            }
        )
        .is_err());

    registry.end_session("t").unwrap();
    assert_eq!(registry.decrement_tally("t").unwrap().count, 0);
    assert_eq!(registry.get_total_focus_time("t").unwrap(), 0);
}

#[test]
fn breakdown_total_is_sum_of_parts_mid_session() {
    let (clock, registry) = registry();
    registry
        .initialize_task(&task("t", 120.0, 1, 1500.0))
        .unwrap();
    registry.start_pomodoro("t", None).unwrap();
    clock.advance_secs(77);
    registry
        .set_time_components(
            "t",
            TimeComponents {
                incomplete_pomodoro_time: Some(33.7),
                ..TimeComponents::default()
            },
        )
        .unwrap();

    let b = registry.get_time_breakdown("t").unwrap();
    assert_eq!(
        b.total,
        b.manual_time + b.completed_pomodoro_time + b.incomplete_pomodoro_time + b.current_session_time
    );
    assert_eq!(b.total, 120 + 1500 + 33 + 77);
    assert_eq!(b.tracking_mode, TrackingMode::Pomodoro);
}

#[test]
fn independent_registries_do_not_share_tasks() {
    let (_, first) = registry();
    let (_, second) = registry();
    first.initialize_task(&task("t", 60.0, 0, 1500.0)).unwrap();
    assert!(second.get_total_focus_time("t").is_err());
}

#[tokio::test(start_paused = true)]
async fn live_updates_flow_until_cleanup() {
    let (_, registry) = registry();
    registry.initialize_task(&LegacyTask::new("t")).unwrap();
    let updates = Arc::new(AtomicUsize::new(0));
    let sink = updates.clone();
    let _sub = registry
        .on_time_update("t", move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    registry.start_manual_timer("t").unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(updates.load(Ordering::SeqCst) >= 3);

    registry.cleanup_all();
    let settled = updates.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(updates.load(Ordering::SeqCst), settled);
    assert!(registry.is_empty());
}

#[test]
fn coordinator_can_be_used_standalone() {
    init();
    let clock = Arc::new(ManualClock::default());
    let coordinator = FocusTimeCoordinator::with_settings(
        "standalone",
        &TrackerSettings::default(),
        clock.clone(),
    );
    coordinator.start_pomodoro(25.0 * 60.0).unwrap();
    clock.advance_secs(25 * 60);
    let credited = coordinator.complete_pomodoro().unwrap();

    let notice = formatter::pomodoro_completed(credited);
    assert!(notice.message.contains("25 minutes"));
    assert_eq!(coordinator.get_total_focus_time(), 1500);
}
