//! Metric computation and the caching engine wrapper.
//!
//! # Responsibility
//! - `compute_analytics`: pure aggregation over a member snapshot, a date
//!   range, and filters.
//! - `AnalyticsEngine`: owns the configuration and a cached snapshot with
//!   an explicit invalidate/recompute pair.
//!
//! # Invariants
//! - Zero denominators yield 0 for rates and 100 for efficiency ratios
//!   ("no data = fully efficient"); this shapes dashboard semantics and
//!   must not be normalized away.
//! - Only overdue/upcoming-deadline figures depend on `now` beyond the
//!   supplied range; everything else is a function of the snapshot.

use crate::analytics::config::{
    end_of_week, start_of_week, AnalyticsConfig, AnalyticsFilters, DatePreset, DateRange,
    ViewSettings,
};
use crate::analytics::metrics::{
    AnalyticsSnapshot, CategoryMetrics, DeadlineAnalytics, MemberMetrics, PriorityMetrics,
    TeamOverview,
};
use crate::model::member::Member;
use crate::model::task::{Task, TaskCategory, TaskPriority};
use chrono::{DateTime, Duration, Utc};
use log::info;
use std::collections::BTreeMap;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Admission test for one task.
///
/// A task is admitted when any of its `created_at`/`updated_at`/
/// `completed_at` stamps falls inside the range (inclusive, union
/// semantics — deliberately not a due-date window), its category and
/// priority pass the allow-lists, and its completion bucket is enabled.
pub fn admits_task(task: &Task, range: &DateRange, filters: &AnalyticsFilters) -> bool {
    let in_range = range.contains(task.created_at)
        || range.contains(task.updated_at)
        || task.completed_at.is_some_and(|done| range.contains(done));
    if !in_range {
        return false;
    }

    if !filters.selected_categories.is_empty()
        && !filters.selected_categories.contains(&task.category)
    {
        return false;
    }
    if !filters.selected_priorities.is_empty()
        && !filters.selected_priorities.contains(&task.priority)
    {
        return false;
    }

    match task.progress {
        100 => filters.include_completed,
        0 => filters.include_not_started,
        _ => filters.include_in_progress,
    }
}

/// Computes the full derived report. Pure: identical inputs (including
/// `now`) produce identical output.
pub fn compute_analytics(
    members: &[Member],
    range: &DateRange,
    filters: &AnalyticsFilters,
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let admitted_members: Vec<&Member> = members
        .iter()
        .filter(|member| {
            filters.selected_members.is_empty() || filters.selected_members.contains(&member.id)
        })
        .collect();

    let week = DateRange {
        start: start_of_week(now),
        end: end_of_week(now),
    };

    let mut total_tasks = 0usize;
    let mut completed_tasks = 0usize;
    let mut in_progress_tasks = 0usize;
    let mut overdue_tasks = 0usize;
    let mut total_time_tracked_ms = 0i64;
    let mut total_completion_ms = 0i64;
    let mut completed_with_time = 0usize;

    let mut member_metrics = BTreeMap::new();
    let mut category_metrics: BTreeMap<TaskCategory, CategoryMetrics> = BTreeMap::new();
    let mut priority_metrics: BTreeMap<TaskPriority, PriorityMetrics> = BTreeMap::new();

    for member in &admitted_members {
        let tasks: Vec<&Task> = member
            .tasks
            .iter()
            .filter(|task| admits_task(task, range, filters))
            .collect();

        let member_completed = tasks.iter().filter(|task| task.progress == 100).count();
        let member_in_progress = tasks
            .iter()
            .filter(|task| task.progress > 0 && task.progress < 100)
            .count();
        let member_overdue = tasks.iter().filter(|task| task.is_overdue(now)).count();
        let time_tracked_ms: i64 = tasks
            .iter()
            .map(|task| task.time_tracking.total_time_ms)
            .sum();

        total_tasks += tasks.len();
        completed_tasks += member_completed;
        in_progress_tasks += member_in_progress;
        overdue_tasks += member_overdue;
        total_time_tracked_ms += time_tracked_ms;

        for task in tasks.iter().filter(|task| task.progress == 100) {
            if let Some(done) = task.completed_at {
                total_completion_ms += (done - task.created_at).num_milliseconds();
                completed_with_time += 1;
            }
        }

        member_metrics.insert(
            member.id,
            MemberMetrics {
                name: member.name.clone(),
                total_tasks: tasks.len(),
                completed_tasks: member_completed,
                in_progress_tasks: member_in_progress,
                overdue_tasks: member_overdue,
                completion_rate: percentage(member_completed, tasks.len()),
                average_progress: average_progress(&tasks),
                time_tracked_ms,
                hours_tracked: time_tracked_ms as f64 / MS_PER_HOUR,
                productivity_score: member_productivity_score(&tasks, time_tracked_ms),
                tasks_this_week: tasks
                    .iter()
                    .filter(|task| {
                        range.contains(task.updated_at) && week.contains(task.updated_at)
                    })
                    .count(),
            },
        );

        for task in &tasks {
            let bucket = category_metrics.entry(task.category).or_default();
            bucket.total_tasks += 1;
            if task.progress == 100 {
                bucket.completed_tasks += 1;
            }
            bucket.total_time_ms += task.time_tracking.total_time_ms;
        }

        for task in &tasks {
            let bucket = priority_metrics.entry(task.priority).or_default();
            bucket.total_tasks += 1;
            if task.progress == 100 {
                bucket.completed_tasks += 1;
                if task
                    .completed_at
                    .is_some_and(|done| done <= task.due_instant())
                {
                    bucket.on_time += 1;
                }
            } else if task.due_instant() < now {
                bucket.overdue += 1;
            }
        }
    }

    for bucket in category_metrics.values_mut() {
        bucket.completion_rate = percentage(bucket.completed_tasks, bucket.total_tasks);
        bucket.average_time_ms = if bucket.completed_tasks > 0 {
            bucket.total_time_ms as f64 / bucket.completed_tasks as f64
        } else {
            0.0
        };
    }

    let completion_rate = percentage(completed_tasks, total_tasks);
    let overdue_rate = percentage(overdue_tasks, total_tasks);

    AnalyticsSnapshot {
        team_overview: TeamOverview {
            total_tasks,
            completed_tasks,
            in_progress_tasks,
            overdue_tasks,
            total_time_tracked_hours: total_time_tracked_ms as f64 / MS_PER_HOUR,
            average_completion_time_days: if completed_with_time > 0 {
                total_completion_ms as f64 / completed_with_time as f64 / MS_PER_DAY
            } else {
                0.0
            },
            productivity_score: team_productivity_score(
                completion_rate,
                overdue_rate,
                team_time_efficiency(&admitted_members),
            ),
        },
        member_metrics,
        category_metrics,
        priority_metrics,
        deadline_analytics: deadline_analytics(&admitted_members, now),
    }
}

/// Weighted member score: 40% completion, 30% progress, 20% timeliness,
/// 10% time efficiency. An empty task set scores 0.
fn member_productivity_score(tasks: &[&Task], time_tracked_ms: i64) -> u32 {
    if tasks.is_empty() {
        return 0;
    }

    let completed = tasks.iter().filter(|task| task.progress == 100).count();
    let completion_rate = percentage(completed, tasks.len());
    let progress = average_progress(tasks);
    let on_time = on_time_rate(tasks);
    let efficiency = task_time_efficiency(tasks, time_tracked_ms);

    (completion_rate * 0.4 + progress * 0.3 + on_time * 0.2 + efficiency * 0.1).round() as u32
}

/// Weighted team score: 50% completion, 30% overdue impact, 20% time
/// efficiency. Overdue tasks hurt twice their rate, floored at 0.
fn team_productivity_score(completion_rate: f64, overdue_rate: f64, time_efficiency: f64) -> u32 {
    let overdue_impact = (100.0 - overdue_rate * 2.0).max(0.0);
    (completion_rate * 0.5 + overdue_impact * 0.3 + time_efficiency * 0.2).round() as u32
}

/// Percent of completed tasks finished by their due instant; 100 when the
/// member has no completed tasks yet.
fn on_time_rate(tasks: &[&Task]) -> f64 {
    let completed: Vec<&&Task> = tasks
        .iter()
        .filter(|task| task.progress == 100 && task.completed_at.is_some())
        .collect();
    if completed.is_empty() {
        return 100.0;
    }
    let on_time = completed
        .iter()
        .filter(|task| {
            task.completed_at
                .is_some_and(|done| done <= task.due_instant())
        })
        .count();
    percentage(on_time, completed.len())
}

/// Estimated-over-tracked ratio for one member's admitted tasks, capped
/// at 100; no tracked time counts as fully efficient.
fn task_time_efficiency(tasks: &[&Task], time_tracked_ms: i64) -> f64 {
    let estimated: f64 = tasks.iter().map(|task| task.estimated_hours).sum();
    let actual_hours = time_tracked_ms as f64 / MS_PER_HOUR;
    if actual_hours == 0.0 {
        return 100.0;
    }
    (estimated / actual_hours * 100.0).min(100.0)
}

/// Team-wide estimated-over-actual ratio.
///
/// Spans ALL tasks of the admitted members that carry both an estimate
/// and tracked time, not the date/category-admitted subset.
fn team_time_efficiency(members: &[&Member]) -> f64 {
    let mut estimated = 0.0;
    let mut actual = 0.0;
    for member in members {
        for task in &member.tasks {
            if task.estimated_hours > 0.0 && task.actual_hours() > 0.0 {
                estimated += task.estimated_hours;
                actual += task.actual_hours();
            }
        }
    }
    if actual == 0.0 {
        return 100.0;
    }
    (estimated / actual * 100.0).min(100.0)
}

/// Timeliness summary over all tasks of the admitted members (task
/// admission deliberately not applied).
fn deadline_analytics(members: &[&Member], now: DateTime<Utc>) -> DeadlineAnalytics {
    let mut completed = 0usize;
    let mut on_time = 0usize;
    let mut total_delay_days = 0.0;
    let mut upcoming = 0usize;
    let next_week = now + Duration::days(7);

    for member in members {
        for task in &member.tasks {
            if task.progress == 100 {
                if let Some(done) = task.completed_at {
                    completed += 1;
                    let due = task.due_instant();
                    if done <= due {
                        on_time += 1;
                    } else {
                        total_delay_days += (done - due).num_milliseconds() as f64 / MS_PER_DAY;
                    }
                }
            } else {
                let due = task.due_instant();
                if due >= now && due <= next_week {
                    upcoming += 1;
                }
            }
        }
    }

    let late = completed - on_time;
    DeadlineAnalytics {
        on_time_completion: if completed > 0 {
            percentage(on_time, completed)
        } else {
            100.0
        },
        average_delay_days: if late > 0 {
            total_delay_days / late as f64
        } else {
            0.0
        },
        upcoming_deadlines: upcoming,
    }
}

fn average_progress(tasks: &[&Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    tasks
        .iter()
        .map(|task| f64::from(task.progress))
        .sum::<f64>()
        / tasks.len() as f64
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Configuration plus cached snapshot; callers explicitly request
/// recomputation after mutations or on their refresh timer.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    cached: Option<AnalyticsSnapshot>,
    last_calculated: Option<DateTime<Utc>>,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            cached: None,
            last_calculated: None,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Replaces the window with an explicit range, switching the preset
    /// to `Custom`.
    pub fn set_date_range(&mut self, range: DateRange) {
        self.config.date_range = range;
        self.config.preset = DatePreset::Custom;
        self.invalidate();
    }

    /// Applies a named preset resolved against `now`. `Custom` leaves the
    /// current explicit range untouched.
    pub fn set_preset(&mut self, preset: DatePreset, now: DateTime<Utc>) {
        if let Some(range) = preset.resolve(now) {
            self.config.date_range = range;
            self.config.preset = preset;
            self.invalidate();
        }
    }

    pub fn set_filters(&mut self, filters: AnalyticsFilters) {
        self.config.filters = filters;
        self.invalidate();
    }

    /// View preferences never affect the computed numbers, so the cache
    /// survives.
    pub fn set_view(&mut self, view: ViewSettings) {
        self.config.view = view;
    }

    /// Drops the cached snapshot; the next read must recompute.
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.last_calculated = None;
    }

    pub fn is_stale(&self) -> bool {
        self.cached.is_none()
    }

    /// Recomputes from the given snapshot and caches the result.
    pub fn recompute(&mut self, members: &[Member], now: DateTime<Utc>) -> &AnalyticsSnapshot {
        let snapshot =
            compute_analytics(members, &self.config.date_range, &self.config.filters, now);
        info!(
            "event=analytics_recompute module=analytics status=ok tasks={} members={}",
            snapshot.team_overview.total_tasks,
            snapshot.member_metrics.len()
        );
        self.last_calculated = Some(now);
        self.cached.insert(snapshot)
    }

    pub fn cached(&self) -> Option<&AnalyticsSnapshot> {
        self.cached.as_ref()
    }

    pub fn last_calculated(&self) -> Option<DateTime<Utc>> {
        self.last_calculated
    }
}

#[cfg(test)]
mod tests {
    use super::{percentage, team_productivity_score, team_time_efficiency};
    use crate::model::member::{Member, MemberStatus};

    #[test]
    fn percentage_of_zero_total_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 4), 75.0);
    }

    #[test]
    fn team_efficiency_without_tracked_time_is_fully_efficient() {
        let members = [Member::new(1, "Anna", MemberStatus::Working)];
        let refs: Vec<&Member> = members.iter().collect();
        assert_eq!(team_time_efficiency(&refs), 100.0);
    }

    #[test]
    fn overdue_impact_floors_at_zero() {
        // 60% overdue doubles to 120, floored to 0 impact.
        let score = team_productivity_score(50.0, 60.0, 100.0);
        assert_eq!(score, (50.0_f64 * 0.5 + 0.0 + 100.0 * 0.2).round() as u32);
    }
}
