//! Demo team fixture.
//!
//! # Responsibility
//! - Provide the sample members and starter tasks the dashboard boots
//!   with, shaped relative to a caller-supplied "now" so due dates and
//!   history stay meaningful.

use crate::model::member::{Member, MemberId, MemberStatus};
use crate::model::task::{
    Task, TaskCategory, TaskId, TaskPriority, TaskStatus, TimeTracking,
};
use chrono::{DateTime, Duration, Utc};

/// Builds the four-member demo team with its starter tasks.
pub fn demo_team(now: DateTime<Utc>) -> Vec<Member> {
    let mut john = Member::new(1, "John Doe", MemberStatus::Working);
    john.avatar_ref = Some("avatars/john-doe.png".to_string());
    john.tasks.push(seeded_task(
        1,
        "Complete dashboard design",
        "Finish the overview page layout and widget styling",
        &john,
        "Team Lead",
        now,
        SeedShape {
            due_in_days: 8,
            age_days: 6,
            progress: 60,
            priority: TaskPriority::High,
            category: TaskCategory::Design,
            estimated_hours: 12.0,
            tracked_hours: 5.0,
        },
    ));
    john.tasks.push(seeded_task(
        2,
        "Review code changes",
        "Review the open pull requests for the widget refactor",
        &john,
        "Team Lead",
        now,
        SeedShape {
            due_in_days: 3,
            age_days: 5,
            progress: 100,
            priority: TaskPriority::Medium,
            category: TaskCategory::Development,
            estimated_hours: 4.0,
            tracked_hours: 3.0,
        },
    ));

    let mut jane = Member::new(2, "Jane Smith", MemberStatus::Meeting);
    jane.avatar_ref = Some("avatars/jane-smith.png".to_string());
    jane.tasks.push(seeded_task(
        3,
        "Client presentation prep",
        "Assemble the quarterly review deck",
        &jane,
        "Team Lead",
        now,
        SeedShape {
            due_in_days: 5,
            age_days: 4,
            progress: 30,
            priority: TaskPriority::Urgent,
            category: TaskCategory::Presentation,
            estimated_hours: 8.0,
            tracked_hours: 2.5,
        },
    ));

    let mut mike = Member::new(3, "Mike Johnson", MemberStatus::Break);
    mike.avatar_ref = Some("avatars/mike-johnson.png".to_string());
    mike.tasks.push(seeded_task(
        4,
        "API integration",
        "Wire the reporting endpoints into the data layer",
        &mike,
        "Jane Smith",
        now,
        SeedShape {
            due_in_days: 13,
            age_days: 2,
            progress: 0,
            priority: TaskPriority::Medium,
            category: TaskCategory::Development,
            estimated_hours: 16.0,
            tracked_hours: 0.0,
        },
    ));
    mike.tasks.push(seeded_task(
        5,
        "Testing fixes",
        "Stabilize the flaky integration suite",
        &mike,
        "Team Lead",
        now,
        SeedShape {
            due_in_days: 7,
            age_days: 3,
            progress: 80,
            priority: TaskPriority::High,
            category: TaskCategory::Testing,
            estimated_hours: 6.0,
            tracked_hours: 4.0,
        },
    ));

    let mut sarah = Member::new(4, "Sarah Wilson", MemberStatus::Offline);
    sarah.avatar_ref = Some("avatars/sarah-wilson.png".to_string());

    vec![john, jane, mike, sarah]
}

struct SeedShape {
    due_in_days: i64,
    age_days: i64,
    progress: u8,
    priority: TaskPriority,
    category: TaskCategory,
    estimated_hours: f64,
    tracked_hours: f64,
}

fn seeded_task(
    id: TaskId,
    title: &str,
    description: &str,
    owner: &Member,
    assigned_by: &str,
    now: DateTime<Utc>,
    shape: SeedShape,
) -> Task {
    let created_at = now - Duration::days(shape.age_days);
    let completed_at = (shape.progress == 100).then_some(now - Duration::hours(6));
    let tracked_ms = (shape.tracked_hours * 3_600_000.0) as i64;

    Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        due_date: (now + Duration::days(shape.due_in_days)).date_naive(),
        progress: shape.progress,
        priority: shape.priority,
        category: shape.category,
        status: TaskStatus::from_progress(shape.progress),
        estimated_hours: shape.estimated_hours,
        assigned_by: assigned_by.to_string(),
        assigned_to: owner.name.clone(),
        created_at,
        updated_at: completed_at.unwrap_or(created_at),
        completed_at,
        time_tracking: TimeTracking {
            is_active: false,
            current_session_start: None,
            total_time_ms: tracked_ms,
            sessions: Vec::new(),
        },
        comments: Vec::new(),
        tags: Vec::new(),
    }
}

/// Id of the demo member used by walkthroughs and smoke probes.
pub const DEMO_MEMBER_JANE: MemberId = 2;
