//! Derived metric shapes produced by the analytics engine.
//!
//! All maps are `BTreeMap` so equal inputs yield identical iteration and
//! serialization order.

use crate::model::member::MemberId;
use crate::model::task::{TaskCategory, TaskPriority};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregates over every admitted task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamOverview {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    /// Tracked time over admitted tasks, in hours.
    pub total_time_tracked_hours: f64,
    /// Mean `completed_at - created_at` over completed tasks, in days.
    pub average_completion_time_days: f64,
    /// Weighted composite, 0..=100.
    pub productivity_score: u32,
}

/// Per-member slice of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberMetrics {
    pub name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: f64,
    pub average_progress: f64,
    pub time_tracked_ms: i64,
    pub hours_tracked: f64,
    pub productivity_score: u32,
    /// Admitted tasks touched during the current (Sunday-based) week.
    pub tasks_this_week: usize,
}

/// Per-category bucket totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_time_ms: i64,
    pub completion_rate: f64,
    /// Tracked milliseconds per completed task in the bucket.
    pub average_time_ms: f64,
}

/// Per-priority bucket totals with timeliness counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PriorityMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub on_time: usize,
    pub overdue: usize,
}

/// Timeliness summary over all tasks of admitted members.
///
/// Unlike the rest of the report this deliberately skips task admission,
/// matching the behavior the dashboard was built against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeadlineAnalytics {
    /// Percent of completed tasks finished by their due instant; 100 when
    /// nothing has completed yet.
    pub on_time_completion: f64,
    /// Mean lateness in days over late-completed tasks only.
    pub average_delay_days: f64,
    /// Incomplete tasks due within the next seven days.
    pub upcoming_deadlines: usize,
}

/// Full derived report; purely a function of the inputs it was computed
/// from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsSnapshot {
    pub team_overview: TeamOverview,
    pub member_metrics: BTreeMap<MemberId, MemberMetrics>,
    pub category_metrics: BTreeMap<TaskCategory, CategoryMetrics>,
    pub priority_metrics: BTreeMap<TaskPriority, PriorityMetrics>,
    pub deadline_analytics: DeadlineAnalytics,
}
