use chrono::{DateTime, Duration, TimeZone, Utc};
use teampulse_core::seed::demo_team;
use teampulse_core::{
    AssignTaskRequest, ManualClock, StoreError, TaskCategory, TaskPriority, TaskStatus, TeamStore,
};

#[test]
fn start_promotes_a_not_started_task() {
    let (_, mut store) = store();
    let task_id = assign(&mut store, 2, "fresh");

    store.start_time_tracking(2, task_id).unwrap();

    let task = store.member(2).unwrap().task(task_id).unwrap();
    assert!(task.time_tracking.is_active);
    assert!(task.time_tracking.current_session_start.is_some());
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[test]
fn starting_an_already_tracked_task_errors() {
    let (_, mut store) = store();
    let task_id = assign(&mut store, 2, "busy");
    store.start_time_tracking(2, task_id).unwrap();

    let err = store.start_time_tracking(2, task_id).unwrap_err();
    assert!(matches!(err, StoreError::AlreadyTracking(id) if id == task_id));
    // The open session survives the rejection.
    assert!(store.member(2).unwrap().task(task_id).unwrap().time_tracking.is_active);
}

#[test]
fn starting_another_task_closes_the_previous_session() {
    let (clock, mut store) = store();
    let task_b = assign(&mut store, 2, "B");
    let task_a = assign(&mut store, 2, "A");

    store.start_time_tracking(2, task_b).unwrap();
    clock.advance_ms(10 * 60 * 1000);
    store.start_time_tracking(2, task_a).unwrap();

    let member = store.member(2).unwrap();
    let closed = member.task(task_b).unwrap();
    assert!(!closed.time_tracking.is_active);
    assert_eq!(closed.time_tracking.total_time_ms, 10 * 60 * 1000);
    assert_eq!(closed.time_tracking.sessions.len(), 1);

    let active = member.task(task_a).unwrap();
    assert!(active.time_tracking.is_active);
    assert_eq!(member.active_tracking_task().unwrap().id, task_a);
}

#[test]
fn at_most_one_active_session_per_member_after_any_sequence() {
    let (clock, mut store) = store();
    let first = assign(&mut store, 2, "one");
    let second = assign(&mut store, 2, "two");
    let third = assign(&mut store, 2, "three");

    for task_id in [first, second, third, first, second] {
        store.start_time_tracking(2, task_id).unwrap();
        clock.advance_ms(90_000);
    }
    store.stop_time_tracking(2, second).unwrap();
    store.start_time_tracking(2, third).unwrap();

    for member in store.members() {
        let active = member
            .tasks
            .iter()
            .filter(|task| task.time_tracking.is_active)
            .count();
        assert!(active <= 1, "member {} has {active} active tasks", member.id);
    }
}

#[test]
fn stop_accumulates_duration_and_actual_hours() {
    let (clock, mut store) = store();
    let task_id = assign(&mut store, 2, "timed");

    store.start_time_tracking(2, task_id).unwrap();
    clock.advance_ms(90 * 60 * 1000);
    store.stop_time_tracking(2, task_id).unwrap();

    let task = store.member(2).unwrap().task(task_id).unwrap();
    assert_eq!(task.time_tracking.total_time_ms, 90 * 60 * 1000);
    assert!((task.actual_hours() - 1.5).abs() < 1e-9);
    assert!(!task.time_tracking.is_active);

    // A second session adds to the same total.
    store.start_time_tracking(2, task_id).unwrap();
    clock.advance_ms(30 * 60 * 1000);
    store.stop_time_tracking(2, task_id).unwrap();
    let task = store.member(2).unwrap().task(task_id).unwrap();
    assert_eq!(task.time_tracking.total_time_ms, 120 * 60 * 1000);
    assert_eq!(task.time_tracking.sessions.len(), 2);
}

#[test]
fn stop_without_an_active_session_errors() {
    let (_, mut store) = store();
    let task_id = assign(&mut store, 2, "idle");

    let err = store.stop_time_tracking(2, task_id).unwrap_err();
    assert!(matches!(err, StoreError::NotTracking(id) if id == task_id));
}

#[test]
fn completing_a_tracked_task_folds_the_open_session() {
    let (clock, mut store) = store();
    let task_id = assign(&mut store, 2, "almost done");
    store.update_task_progress(2, task_id, 90).unwrap();

    store.start_time_tracking(2, task_id).unwrap();
    clock.advance_ms(20 * 60 * 1000);
    store.update_task_progress(2, task_id, 100).unwrap();

    let task = store.member(2).unwrap().task(task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.completed_at.is_some());
    assert!(!task.time_tracking.is_active);
    assert!(task.time_tracking.current_session_start.is_none());
    assert_eq!(task.time_tracking.total_time_ms, 20 * 60 * 1000);
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 14, 9, 0, 0).unwrap()
}

fn store() -> (ManualClock, TeamStore<ManualClock>) {
    let clock = ManualClock::starting_at(fixed_now());
    let store = TeamStore::with_clock(clock.clone(), demo_team(fixed_now()));
    (clock, store)
}

fn assign(store: &mut TeamStore<ManualClock>, member_id: u64, title: &str) -> u64 {
    store
        .assign_task(
            member_id,
            AssignTaskRequest {
                title: title.to_string(),
                description: String::new(),
                due_date: (fixed_now() + Duration::days(2)).date_naive(),
                priority: TaskPriority::Medium,
                category: TaskCategory::Development,
                estimated_hours: 2.0,
                assigned_by: "Team Lead".to_string(),
            },
        )
        .unwrap()
}
