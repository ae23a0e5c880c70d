//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `teampulse_core` linkage.
//! - Walk the seeded demo team through one command and print the
//!   resulting dashboard summary.

use chrono::{Duration, Utc};
use teampulse_core::seed::{demo_team, DEMO_MEMBER_JANE};
use teampulse_core::{Command, Dashboard};

fn main() {
    println!("teampulse_core ping={}", teampulse_core::ping());
    println!("teampulse_core version={}", teampulse_core::core_version());

    let now = Utc::now();
    let mut dashboard = Dashboard::new(demo_team(now));

    let assigned = dashboard.dispatch(Command::AssignTask {
        member_id: DEMO_MEMBER_JANE,
        title: "Draft release notes".to_string(),
        description: "Summarize the sprint for stakeholders".to_string(),
        due_date: (now + Duration::days(2)).format("%Y-%m-%d").to_string(),
        priority: "high".to_string(),
        category: "documentation".to_string(),
        estimated_hours: 3.0,
        assigned_by: "Team Lead".to_string(),
    });
    match assigned {
        Ok(emitted) => println!("assigned demo task, notifications={}", emitted.len()),
        Err(err) => eprintln!("assignment failed: {err}"),
    }

    let snapshot = dashboard.refresh_analytics();
    println!(
        "team: tasks={} completed={} overdue={} productivity={}",
        snapshot.team_overview.total_tasks,
        snapshot.team_overview.completed_tasks,
        snapshot.team_overview.overdue_tasks,
        snapshot.team_overview.productivity_score
    );
    for (member_id, metrics) in &snapshot.member_metrics {
        println!(
            "member {member_id} {}: tasks={} score={}",
            metrics.name, metrics.total_tasks, metrics.productivity_score
        );
    }
    println!(
        "unread notifications={}",
        dashboard.notifications().unread_count()
    );
}
