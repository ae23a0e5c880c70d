use chrono::{DateTime, TimeZone, Utc};
use teampulse_core::seed::demo_team;
use teampulse_core::{
    Command, Dashboard, ManualClock, NotificationId, NotificationSettingsPatch, NotificationType,
    TaskPriority, TaskStatus,
};

#[test]
fn assigning_notifies_the_assignee_with_mirrored_priority() {
    let mut dashboard = dashboard();

    let emitted = dashboard
        .dispatch(assign_command(2, "X", "high", "Team Lead"))
        .unwrap();

    let member = dashboard.team().member(2).unwrap();
    let task = member.tasks.last().unwrap();
    assert_eq!(task.progress, 0);
    assert_eq!(task.status, TaskStatus::NotStarted);

    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.kind, NotificationType::TaskAssigned);
    assert_eq!(notification.priority, TaskPriority::High);
    assert_eq!(notification.related_task, Some(task.id));
    assert_eq!(notification.related_user.as_deref(), Some("Jane Smith"));
    assert_eq!(
        notification.action_url.as_deref(),
        Some(format!("/tasks/{}", task.id).as_str())
    );
}

#[test]
fn low_priority_assignment_notifies_at_medium() {
    let mut dashboard = dashboard();
    let emitted = dashboard
        .dispatch(assign_command(2, "small thing", "low", "Team Lead"))
        .unwrap();

    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.priority, TaskPriority::Medium);
}

#[test]
fn distinct_assigner_gets_a_low_priority_confirmation() {
    let mut dashboard = dashboard();
    let emitted = dashboard
        .dispatch(assign_command(2, "delegated", "high", "Team Lead"))
        .unwrap();
    assert_eq!(emitted.len(), 2);

    let confirmation = dashboard.notifications().notification(emitted[1]).unwrap();
    assert_eq!(confirmation.kind, NotificationType::TaskAssigned);
    assert_eq!(confirmation.priority, TaskPriority::Low);
    assert_eq!(confirmation.related_user.as_deref(), Some("Team Lead"));
}

#[test]
fn self_assignment_emits_a_single_notification() {
    let mut dashboard = dashboard();
    let emitted = dashboard
        .dispatch(assign_command(2, "my own task", "medium", "Jane Smith"))
        .unwrap();
    assert_eq!(emitted.len(), 1);
}

#[test]
fn completion_crossing_emits_once() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "finishing");

    dashboard
        .dispatch(progress_command(2, task_id, 80))
        .unwrap();
    let emitted = dashboard
        .dispatch(progress_command(2, task_id, 100))
        .unwrap();
    assert_eq!(emitted.len(), 1);
    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.kind, NotificationType::TaskCompleted);

    // Already at 100: no recross, no refire.
    let emitted = dashboard
        .dispatch(progress_command(2, task_id, 100))
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn milestone_fires_on_the_crossing_only() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "halfway");

    let emitted = dashboard
        .dispatch(progress_command(2, task_id, 55))
        .unwrap();
    assert_eq!(emitted.len(), 1);
    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.kind, NotificationType::TaskProgress);
    assert!(notification.message.contains("55%"));

    // Oscillating above the threshold must not refire: the comparison is
    // against the previously stored value.
    for value in [60, 70, 95] {
        let emitted = dashboard
            .dispatch(progress_command(2, task_id, value))
            .unwrap();
        assert!(emitted.is_empty(), "refired at {value}");
    }
}

#[test]
fn completion_suppresses_the_milestone_notification() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "straight to done");

    let emitted = dashboard
        .dispatch(progress_command(2, task_id, 100))
        .unwrap();
    assert_eq!(emitted.len(), 1);
    assert_eq!(
        dashboard.notifications().notification(emitted[0]).unwrap().kind,
        NotificationType::TaskCompleted
    );
}

#[test]
fn status_change_to_the_same_value_is_silent() {
    let mut dashboard = dashboard();
    // Jane is already in a meeting.
    let emitted = dashboard
        .dispatch(Command::UpdateMemberStatus {
            member_id: 2,
            status: "Meeting".to_string(),
        })
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn status_transitions_pick_type_and_toast_by_target() {
    let mut dashboard = dashboard();

    let toasts_before = dashboard.notifications().toasts().len();
    let emitted = dashboard
        .dispatch(Command::UpdateMemberStatus {
            member_id: 2,
            status: "Working".to_string(),
        })
        .unwrap();
    let online = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(online.kind, NotificationType::MemberOnline);
    assert_eq!(dashboard.notifications().toasts().len(), toasts_before + 1);

    let toasts_before = dashboard.notifications().toasts().len();
    let emitted = dashboard
        .dispatch(Command::UpdateMemberStatus {
            member_id: 2,
            status: "Break".to_string(),
        })
        .unwrap();
    let change = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(change.kind, NotificationType::StatusChanged);
    assert!(change.message.contains("from Working to Break"));
    // No toast for a plain status change.
    assert_eq!(dashboard.notifications().toasts().len(), toasts_before);

    let toasts_before = dashboard.notifications().toasts().len();
    let emitted = dashboard
        .dispatch(Command::UpdateMemberStatus {
            member_id: 2,
            status: "Offline".to_string(),
        })
        .unwrap();
    let offline = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(offline.kind, NotificationType::MemberOffline);
    assert_eq!(dashboard.notifications().toasts().len(), toasts_before + 1);
}

#[test]
fn tracking_notifications_are_low_priority_and_auto_read() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "timed work");
    let unread_before = dashboard.notifications().unread_count();

    let emitted = dashboard
        .dispatch(Command::StartTimeTracking {
            member_id: 2,
            task_id,
        })
        .unwrap();
    let started = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(started.kind, NotificationType::TimeTracking);
    assert_eq!(started.priority, TaskPriority::Low);
    assert!(started.is_read);

    let emitted = dashboard
        .dispatch(Command::StopTimeTracking {
            member_id: 2,
            task_id,
        })
        .unwrap();
    let stopped = dashboard.notifications().notification(emitted[0]).unwrap();
    assert!(stopped.message.contains("stopped tracking"));

    // Auto-read notifications never bump the badge.
    assert_eq!(dashboard.notifications().unread_count(), unread_before);
}

#[test]
fn priority_escalation_notifies_and_de_escalation_stays_silent() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "shifting");

    let emitted = dashboard
        .dispatch(priority_command(2, task_id, "urgent"))
        .unwrap();
    assert_eq!(emitted.len(), 1);
    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.kind, NotificationType::PriorityChanged);
    assert_eq!(notification.priority, TaskPriority::Urgent);
    assert!(notification.message.contains("urgent"));

    let emitted = dashboard
        .dispatch(priority_command(2, task_id, "low"))
        .unwrap();
    assert!(emitted.is_empty());

    // Low to medium is an escalation but stays below the High bar.
    let emitted = dashboard
        .dispatch(priority_command(2, task_id, "medium"))
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn category_changes_are_silent() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "recategorized");

    let emitted = dashboard
        .dispatch(Command::UpdateTaskCategory {
            member_id: 2,
            task_id,
            category: "research".to_string(),
        })
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn comments_notify_unless_the_assignee_comments() {
    let mut dashboard = dashboard();
    let task_id = fresh_task(&mut dashboard, 2, "discussed");

    let emitted = dashboard
        .dispatch(Command::AddTaskComment {
            member_id: 2,
            task_id,
            author: "Team Lead".to_string(),
            text: "please prioritize".to_string(),
        })
        .unwrap();
    assert_eq!(emitted.len(), 1);
    let notification = dashboard.notifications().notification(emitted[0]).unwrap();
    assert_eq!(notification.kind, NotificationType::CommentAdded);
    assert!(notification.message.contains("Team Lead commented"));

    let emitted = dashboard
        .dispatch(Command::AddTaskComment {
            member_id: 2,
            task_id,
            author: "Jane Smith".to_string(),
            text: "on it".to_string(),
        })
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn disabled_task_notifications_silence_assignment_fanout() {
    let mut dashboard = dashboard();
    dashboard
        .notifications_mut()
        .update_settings(NotificationSettingsPatch {
            enable_task_notifications: Some(false),
            ..NotificationSettingsPatch::default()
        });
    let log_before = dashboard.notifications().notifications().len();

    let emitted = dashboard
        .dispatch(assign_command(2, "quiet task", "high", "Team Lead"))
        .unwrap();
    assert!(emitted.is_empty());
    assert_eq!(dashboard.notifications().notifications().len(), log_before);
    // The entity mutation still happened.
    assert!(dashboard
        .team()
        .member(2)
        .unwrap()
        .tasks
        .iter()
        .any(|task| task.title == "quiet task"));
}

#[test]
fn disabled_status_notifications_silence_status_fanout() {
    let mut dashboard = dashboard();
    dashboard
        .notifications_mut()
        .update_settings(NotificationSettingsPatch {
            enable_status_notifications: Some(false),
            ..NotificationSettingsPatch::default()
        });

    let emitted = dashboard
        .dispatch(Command::UpdateMemberStatus {
            member_id: 2,
            status: "Working".to_string(),
        })
        .unwrap();
    assert!(emitted.is_empty());
    assert_eq!(
        dashboard.team().member(2).unwrap().status.as_str(),
        "Working"
    );
}

#[test]
fn deadline_reminders_fire_once_per_unread_reminder() {
    let mut dashboard = dashboard();
    // Due tomorrow relative to the fixed clock (2024-02-14).
    dashboard
        .dispatch(Command::AssignTask {
            member_id: 2,
            title: "due soon".to_string(),
            description: String::new(),
            due_date: "2024-02-15".to_string(),
            priority: "medium".to_string(),
            category: "development".to_string(),
            estimated_hours: 1.0,
            assigned_by: "Team Lead".to_string(),
        })
        .unwrap();

    let first_sweep = dashboard.deadline_reminders();
    assert_eq!(first_sweep.len(), 1);
    let reminder = dashboard
        .notifications()
        .notification(first_sweep[0])
        .unwrap();
    assert_eq!(reminder.kind, NotificationType::DeadlineApproaching);
    assert_eq!(reminder.priority, TaskPriority::Urgent);

    // The unread reminder suppresses duplicates.
    assert!(dashboard.deadline_reminders().is_empty());

    // Once read, the next sweep may remind again.
    let id: NotificationId = first_sweep[0];
    dashboard.notifications_mut().mark_read(id);
    assert_eq!(dashboard.deadline_reminders().len(), 1);
}

#[test]
fn disabled_deadline_reminders_skip_the_sweep() {
    let mut dashboard = dashboard();
    dashboard
        .notifications_mut()
        .update_settings(NotificationSettingsPatch {
            enable_deadline_reminders: Some(false),
            ..NotificationSettingsPatch::default()
        });
    dashboard
        .dispatch(assign_command(2, "due soon", "medium", "Team Lead"))
        .unwrap();

    assert!(dashboard.deadline_reminders().is_empty());
}

#[test]
fn dispatch_invalidates_the_analytics_cache() {
    let mut dashboard = dashboard();
    dashboard.refresh_analytics();
    assert!(!dashboard.analytics().is_stale());

    dashboard
        .dispatch(assign_command(2, "new work", "medium", "Team Lead"))
        .unwrap();
    assert!(dashboard.analytics().is_stale());

    let snapshot = dashboard.refresh_analytics();
    assert!(snapshot.team_overview.total_tasks > 0);
}

#[test]
fn failed_commands_emit_nothing_and_mutate_nothing() {
    let mut dashboard = dashboard();
    let log_before = dashboard.notifications().notifications().len();
    let tasks_before = dashboard.team().member(2).unwrap().tasks.len();

    dashboard
        .dispatch(assign_command(99, "ghost", "high", "Team Lead"))
        .unwrap_err();
    dashboard
        .dispatch(priority_command(2, 999, "urgent"))
        .unwrap_err();

    assert_eq!(dashboard.notifications().notifications().len(), log_before);
    assert_eq!(dashboard.team().member(2).unwrap().tasks.len(), tasks_before);
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 14, 9, 0, 0).unwrap()
}

fn dashboard() -> Dashboard<ManualClock> {
    Dashboard::with_clock(ManualClock::starting_at(fixed_now()), demo_team(fixed_now()))
}

/// Assigns via the store to keep the notification log quiet, returning the
/// new task id.
fn fresh_task(dashboard: &mut Dashboard<ManualClock>, member_id: u64, title: &str) -> u64 {
    dashboard
        .team_mut()
        .assign_task(
            member_id,
            teampulse_core::AssignTaskRequest {
                title: title.to_string(),
                description: String::new(),
                due_date: fixed_now().date_naive() + chrono::Duration::days(3),
                priority: TaskPriority::Low,
                category: teampulse_core::TaskCategory::Development,
                estimated_hours: 2.0,
                assigned_by: "Team Lead".to_string(),
            },
        )
        .unwrap()
}

fn assign_command(member_id: u64, title: &str, priority: &str, assigned_by: &str) -> Command {
    Command::AssignTask {
        member_id,
        title: title.to_string(),
        description: String::new(),
        due_date: "2024-02-15".to_string(),
        priority: priority.to_string(),
        category: "development".to_string(),
        estimated_hours: 2.0,
        assigned_by: assigned_by.to_string(),
    }
}

fn progress_command(member_id: u64, task_id: u64, progress: i64) -> Command {
    Command::UpdateTaskProgress {
        member_id,
        task_id,
        progress,
    }
}

fn priority_command(member_id: u64, task_id: u64, priority: &str) -> Command {
    Command::UpdateTaskPriority {
        member_id,
        task_id,
        priority: priority.to_string(),
    }
}
