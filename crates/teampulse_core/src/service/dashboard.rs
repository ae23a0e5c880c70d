//! Dashboard facade: command dispatch and notification fan-out.
//!
//! # Responsibility
//! - Translate presentation-layer commands (enum-valued fields arrive as
//!   strings) into typed store operations.
//! - Emit notifications derived from the mutation delta, honoring the
//!   per-kind delivery settings.
//!
//! # Invariants
//! - Milestone/completion notifications are one-shot: they fire on the
//!   crossing only, judged against the previously stored progress.
//! - A failed store operation emits nothing.

use crate::analytics::config::AnalyticsConfig;
use crate::analytics::engine::AnalyticsEngine;
use crate::analytics::metrics::AnalyticsSnapshot;
use crate::clock::{Clock, SystemClock};
use crate::model::member::{Member, MemberId, MemberStatus};
use crate::model::notification::{NewNotification, NotificationId, NotificationType};
use crate::model::task::{TaskCategory, TaskId, TaskPriority};
use crate::store::notification_store::NotificationStore;
use crate::store::team_store::{AssignTaskRequest, TeamStore};
use crate::store::{StoreError, StoreResult};
use chrono::{Duration, NaiveDate};

/// Milestone threshold for progress notifications.
const MILESTONE_PROGRESS: u8 = 50;

/// Tagged commands accepted from the presentation layer.
///
/// Enum-valued fields (`status`, `priority`, `category`) and dates arrive
/// as strings and are validated at dispatch; everything below the command
/// boundary is typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    UpdateMemberStatus {
        member_id: MemberId,
        status: String,
    },
    AssignTask {
        member_id: MemberId,
        title: String,
        description: String,
        due_date: String,
        priority: String,
        category: String,
        estimated_hours: f64,
        assigned_by: String,
    },
    UpdateTaskProgress {
        member_id: MemberId,
        task_id: TaskId,
        progress: i64,
    },
    CompleteTask {
        member_id: MemberId,
        task_id: TaskId,
    },
    StartTimeTracking {
        member_id: MemberId,
        task_id: TaskId,
    },
    StopTimeTracking {
        member_id: MemberId,
        task_id: TaskId,
    },
    AddTaskComment {
        member_id: MemberId,
        task_id: TaskId,
        author: String,
        text: String,
    },
    UpdateTaskPriority {
        member_id: MemberId,
        task_id: TaskId,
        priority: String,
    },
    UpdateTaskCategory {
        member_id: MemberId,
        task_id: TaskId,
        category: String,
    },
}

/// The state core behind the dashboard UI: both stores plus the analytics
/// engine, driven through command dispatch.
pub struct Dashboard<C: Clock + Clone = SystemClock> {
    clock: C,
    team: TeamStore<C>,
    notifications: NotificationStore<C>,
    analytics: AnalyticsEngine,
}

impl Dashboard<SystemClock> {
    /// Creates a dashboard over seed members using the system clock.
    pub fn new(members: Vec<Member>) -> Self {
        Self::with_clock(SystemClock, members)
    }
}

impl<C: Clock + Clone> Dashboard<C> {
    /// Creates a dashboard with an explicit time source shared by both
    /// stores.
    pub fn with_clock(clock: C, members: Vec<Member>) -> Self {
        let analytics = AnalyticsEngine::new(AnalyticsConfig::this_month(clock.now()));
        Self {
            team: TeamStore::with_clock(clock.clone(), members),
            notifications: NotificationStore::with_clock(clock.clone()),
            analytics,
            clock,
        }
    }

    /// Applies one command and returns the ids of the notifications it
    /// emitted. State is unchanged when an error is returned.
    pub fn dispatch(&mut self, command: Command) -> StoreResult<Vec<NotificationId>> {
        let emitted = match command {
            Command::UpdateMemberStatus { member_id, status } => {
                self.update_member_status(member_id, &status)?
            }
            Command::AssignTask {
                member_id,
                title,
                description,
                due_date,
                priority,
                category,
                estimated_hours,
                assigned_by,
            } => self.assign_task(
                member_id,
                title,
                description,
                &due_date,
                &priority,
                &category,
                estimated_hours,
                assigned_by,
            )?,
            Command::UpdateTaskProgress {
                member_id,
                task_id,
                progress,
            } => self.update_task_progress(member_id, task_id, progress)?,
            Command::CompleteTask { member_id, task_id } => {
                self.update_task_progress(member_id, task_id, 100)?
            }
            Command::StartTimeTracking { member_id, task_id } => {
                self.track_time(member_id, task_id, true)?
            }
            Command::StopTimeTracking { member_id, task_id } => {
                self.track_time(member_id, task_id, false)?
            }
            Command::AddTaskComment {
                member_id,
                task_id,
                author,
                text,
            } => self.add_task_comment(member_id, task_id, author, text)?,
            Command::UpdateTaskPriority {
                member_id,
                task_id,
                priority,
            } => self.update_task_priority(member_id, task_id, &priority)?,
            Command::UpdateTaskCategory {
                member_id,
                task_id,
                category,
            } => self.update_task_category(member_id, task_id, &category)?,
        };

        // Entity state changed; cached metrics are stale.
        self.analytics.invalidate();
        Ok(emitted)
    }

    /// Emits one reminder per incomplete task due within the next 24
    /// hours, skipping tasks that already carry an unread reminder.
    pub fn deadline_reminders(&mut self) -> Vec<NotificationId> {
        if !self.notifications.settings().enable_deadline_reminders {
            return Vec::new();
        }

        let now = self.clock.now();
        let window_end = now + Duration::hours(24);
        let due_soon: Vec<(TaskId, String, String)> = self
            .team
            .members()
            .iter()
            .flat_map(|member| member.tasks.iter().map(move |task| (member, task)))
            .filter(|(_, task)| {
                let due = task.due_instant();
                task.progress < 100 && due > now && due <= window_end
            })
            .map(|(member, task)| (task.id, task.title.clone(), member.name.clone()))
            .collect();

        let mut emitted = Vec::new();
        for (task_id, title, member_name) in due_soon {
            let already_pending = self.notifications.notifications().iter().any(|existing| {
                existing.kind == NotificationType::DeadlineApproaching
                    && existing.related_task == Some(task_id)
                    && !existing.is_read
            });
            if already_pending {
                continue;
            }

            let mut reminder = NewNotification::new(
                NotificationType::DeadlineApproaching,
                "Deadline Reminder",
                format!("Task \"{title}\" assigned to {member_name} is due tomorrow"),
            );
            reminder.priority = TaskPriority::Urgent;
            reminder.related_user = Some(member_name);
            reminder.related_task = Some(task_id);
            reminder.action_url = Some(format!("/tasks/{task_id}"));
            emitted.push(self.notifications.add(reminder));
        }
        emitted
    }

    /// Recomputes analytics from current entity state at "now".
    pub fn refresh_analytics(&mut self) -> &AnalyticsSnapshot {
        let now = self.clock.now();
        self.analytics.recompute(self.team.members(), now)
    }

    pub fn team(&self) -> &TeamStore<C> {
        &self.team
    }

    pub fn team_mut(&mut self) -> &mut TeamStore<C> {
        &mut self.team
    }

    pub fn notifications(&self) -> &NotificationStore<C> {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationStore<C> {
        &mut self.notifications
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub fn analytics_mut(&mut self) -> &mut AnalyticsEngine {
        &mut self.analytics
    }

    fn update_member_status(
        &mut self,
        member_id: MemberId,
        status: &str,
    ) -> StoreResult<Vec<NotificationId>> {
        let Some(status) = MemberStatus::parse(status) else {
            return self.reject_enum("status", status);
        };
        let previous = self.team.member(member_id).map(|member| member.status);
        self.team.update_member_status(member_id, status)?;

        if previous == Some(status) || !self.notifications.settings().enable_status_notifications {
            return Ok(Vec::new());
        }
        let Some(member) = self.team.member(member_id) else {
            return Ok(Vec::new());
        };
        let name = member.name.clone();

        let (kind, title, message) = match status {
            MemberStatus::Working => (
                NotificationType::MemberOnline,
                "Member Online",
                format!("{name} is now online"),
            ),
            MemberStatus::Offline => (
                NotificationType::MemberOffline,
                "Member Offline",
                format!("{name} is now offline"),
            ),
            other => (
                NotificationType::StatusChanged,
                "Status Updated",
                match previous {
                    Some(old) => format!(
                        "{name} changed status from {} to {}",
                        old.as_str(),
                        other.as_str()
                    ),
                    None => format!("{name} is now {}", other.as_str()),
                },
            ),
        };

        let mut notification = NewNotification::new(kind, title, message);
        notification.priority = match kind {
            NotificationType::StatusChanged => TaskPriority::Low,
            _ => TaskPriority::Medium,
        };
        notification.related_user = Some(name);
        // Toast only for transitions into Working or Offline.
        notification.show_as_toast = matches!(
            status,
            MemberStatus::Working | MemberStatus::Offline
        );
        Ok(vec![self.notifications.add(notification)])
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_task(
        &mut self,
        member_id: MemberId,
        title: String,
        description: String,
        due_date: &str,
        priority: &str,
        category: &str,
        estimated_hours: f64,
        assigned_by: String,
    ) -> StoreResult<Vec<NotificationId>> {
        if title.trim().is_empty() {
            return self.reject(StoreError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let Ok(due_date) = NaiveDate::parse_from_str(due_date, "%Y-%m-%d") else {
            return self.reject(StoreError::Validation(format!(
                "invalid due date `{due_date}`, expected YYYY-MM-DD"
            )));
        };
        if due_date < self.clock.now().date_naive() {
            return self.reject(StoreError::Validation(
                "due date must not be in the past".to_string(),
            ));
        }
        let Some(priority) = TaskPriority::parse(priority) else {
            return self.reject_enum("priority", priority);
        };
        let Some(category) = TaskCategory::parse(category) else {
            return self.reject_enum("category", category);
        };

        let task_id = self.team.assign_task(
            member_id,
            AssignTaskRequest {
                title: title.clone(),
                description,
                due_date,
                priority,
                category,
                estimated_hours,
                assigned_by: assigned_by.clone(),
            },
        )?;

        if !self.notifications.settings().enable_task_notifications {
            return Ok(Vec::new());
        }
        let Some(member) = self.team.member(member_id) else {
            return Ok(Vec::new());
        };
        let assignee = member.name.clone();

        let mut emitted = Vec::new();
        let mut assigned = NewNotification::new(
            NotificationType::TaskAssigned,
            "New Task Assigned",
            format!("{assignee} has been assigned \"{title}\" by {assigned_by}"),
        );
        assigned.priority = notification_priority(priority);
        assigned.related_user = Some(assignee.clone());
        assigned.related_task = Some(task_id);
        assigned.action_url = Some(format!("/tasks/{task_id}"));
        emitted.push(self.notifications.add(assigned));

        if assigned_by != assignee {
            let mut confirmation = NewNotification::new(
                NotificationType::TaskAssigned,
                "Task Assigned",
                format!("You assigned \"{title}\" to {assignee}"),
            );
            confirmation.priority = TaskPriority::Low;
            confirmation.related_user = Some(assigned_by);
            confirmation.related_task = Some(task_id);
            confirmation.show_as_toast = false;
            emitted.push(self.notifications.add(confirmation));
        }
        Ok(emitted)
    }

    fn update_task_progress(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        progress: i64,
    ) -> StoreResult<Vec<NotificationId>> {
        let previous = self
            .team
            .member(member_id)
            .and_then(|member| member.task(task_id))
            .map(|task| task.progress);
        self.team.update_task_progress(member_id, task_id, progress)?;

        if !self.notifications.settings().enable_task_notifications {
            return Ok(Vec::new());
        }
        let Some(previous) = previous else {
            return Ok(Vec::new());
        };
        let Some((title, assignee, current)) = self.task_display(member_id, task_id) else {
            return Ok(Vec::new());
        };

        // One-shot thresholds: judged against the previously stored value.
        if previous < 100 && current == 100 {
            let mut completed = NewNotification::new(
                NotificationType::TaskCompleted,
                "Task Completed! 🎉",
                format!("\"{title}\" has been completed by {assignee}"),
            );
            completed.related_user = Some(assignee);
            completed.related_task = Some(task_id);
            completed.action_url = Some(format!("/tasks/{task_id}"));
            return Ok(vec![self.notifications.add(completed)]);
        }
        if previous < MILESTONE_PROGRESS && current >= MILESTONE_PROGRESS && current < 100 {
            let mut milestone = NewNotification::new(
                NotificationType::TaskProgress,
                "Great Progress!",
                format!("\"{title}\" is now {current}% complete by {assignee}"),
            );
            milestone.related_user = Some(assignee);
            milestone.related_task = Some(task_id);
            milestone.action_url = Some(format!("/tasks/{task_id}"));
            return Ok(vec![self.notifications.add(milestone)]);
        }
        Ok(Vec::new())
    }

    fn track_time(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        start: bool,
    ) -> StoreResult<Vec<NotificationId>> {
        if start {
            self.team.start_time_tracking(member_id, task_id)?;
        } else {
            self.team.stop_time_tracking(member_id, task_id)?;
        }

        if !self.notifications.settings().enable_task_notifications {
            return Ok(Vec::new());
        }
        let Some((title, assignee, _)) = self.task_display(member_id, task_id) else {
            return Ok(Vec::new());
        };

        let (heading, verb) = if start {
            ("Time Tracking Started", "started")
        } else {
            ("Time Tracking Stopped", "stopped")
        };
        let mut notification = NewNotification::new(
            NotificationType::TimeTracking,
            heading,
            format!("{assignee} {verb} tracking time for \"{title}\""),
        );
        notification.priority = TaskPriority::Low;
        notification.auto_read = true;
        notification.show_as_toast = false;
        notification.related_user = Some(assignee);
        notification.related_task = Some(task_id);
        Ok(vec![self.notifications.add(notification)])
    }

    fn add_task_comment(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        author: String,
        text: String,
    ) -> StoreResult<Vec<NotificationId>> {
        self.team
            .add_task_comment(member_id, task_id, author.clone(), text)?;

        if !self.notifications.settings().enable_comment_notifications {
            return Ok(Vec::new());
        }
        let Some((title, assignee, _)) = self.task_display(member_id, task_id) else {
            return Ok(Vec::new());
        };
        // The assignee commenting on their own task is not news to them.
        if author == assignee {
            return Ok(Vec::new());
        }

        let mut notification = NewNotification::new(
            NotificationType::CommentAdded,
            "New Comment",
            format!("{author} commented on \"{title}\""),
        );
        notification.related_user = Some(author);
        notification.related_task = Some(task_id);
        notification.action_url = Some(format!("/tasks/{task_id}"));
        Ok(vec![self.notifications.add(notification)])
    }

    fn update_task_priority(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        priority: &str,
    ) -> StoreResult<Vec<NotificationId>> {
        let Some(priority) = TaskPriority::parse(priority) else {
            return self.reject_enum("priority", priority);
        };
        let previous = self
            .team
            .member(member_id)
            .and_then(|member| member.task(task_id))
            .map(|task| task.priority);
        self.team.update_task_priority(member_id, task_id, priority)?;

        // Escalations to High/Urgent are news; de-escalations are not.
        let escalated =
            previous.is_some_and(|old| priority > old) && priority >= TaskPriority::High;
        if !escalated || !self.notifications.settings().enable_task_notifications {
            return Ok(Vec::new());
        }
        let Some((title, assignee, _)) = self.task_display(member_id, task_id) else {
            return Ok(Vec::new());
        };

        let mut notification = NewNotification::new(
            NotificationType::PriorityChanged,
            "Priority Updated",
            format!("\"{title}\" priority changed to {}", priority.as_str()),
        );
        notification.priority = notification_priority(priority);
        notification.related_user = Some(assignee);
        notification.related_task = Some(task_id);
        notification.action_url = Some(format!("/tasks/{task_id}"));
        Ok(vec![self.notifications.add(notification)])
    }

    fn update_task_category(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        category: &str,
    ) -> StoreResult<Vec<NotificationId>> {
        let Some(category) = TaskCategory::parse(category) else {
            return self.reject_enum("category", category);
        };
        self.team.update_task_category(member_id, task_id, category)?;
        // Category changes are silent.
        Ok(Vec::new())
    }

    fn task_display(&self, member_id: MemberId, task_id: TaskId) -> Option<(String, String, u8)> {
        let member = self.team.member(member_id)?;
        let task = member.task(task_id)?;
        Some((task.title.clone(), member.name.clone(), task.progress))
    }

    fn reject<T>(&mut self, error: StoreError) -> StoreResult<T> {
        self.team.note_error(error.clone());
        Err(error)
    }

    fn reject_enum<T>(&mut self, field: &'static str, value: &str) -> StoreResult<T> {
        self.reject(StoreError::InvalidEnumValue {
            field,
            value: value.to_string(),
        })
    }
}

/// Notification priority mirrors the task priority, capped to the
/// urgent/high/medium tiers.
fn notification_priority(task_priority: TaskPriority) -> TaskPriority {
    if task_priority >= TaskPriority::High {
        task_priority
    } else {
        TaskPriority::Medium
    }
}
