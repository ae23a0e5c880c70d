//! Entity store: authoritative member/task state.
//!
//! # Responsibility
//! - Hold the single source of truth for members and their tasks.
//! - Enforce the progress/status and single-active-session invariants on
//!   every mutation path.
//!
//! # Invariants
//! - Task and comment ids are monotonically increasing and never reused.
//! - At most one task per member has an open tracking session.
//! - Operations validate before mutating; a failed operation changes
//!   nothing except the last-error slot.

use crate::clock::{Clock, SystemClock};
use crate::model::member::{Member, MemberId, MemberStatus};
use crate::model::task::{
    clamp_progress, Comment, CommentId, Task, TaskCategory, TaskId, TaskPriority, TaskStatus,
    TimeTracking,
};
use crate::store::{StoreError, StoreResult};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Sort key for the member list projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSort {
    Name,
    ActiveTasks,
}

/// Input for [`TeamStore::assign_task`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub estimated_hours: f64,
    pub assigned_by: String,
}

/// In-memory store for the team tree.
pub struct TeamStore<C: Clock = SystemClock> {
    clock: C,
    members: Vec<Member>,
    next_task_id: TaskId,
    next_comment_id: CommentId,
    status_filter: Option<MemberStatus>,
    sort_by: MemberSort,
    last_error: Option<StoreError>,
}

impl TeamStore<SystemClock> {
    /// Creates a store over the given seed members using the system clock.
    pub fn new(members: Vec<Member>) -> Self {
        Self::with_clock(SystemClock, members)
    }
}

impl<C: Clock> TeamStore<C> {
    /// Creates a store with an explicit time source.
    ///
    /// Id counters resume after the highest id present in the seed data.
    pub fn with_clock(clock: C, members: Vec<Member>) -> Self {
        let next_task_id = members
            .iter()
            .flat_map(|member| member.tasks.iter())
            .map(|task| task.id)
            .max()
            .map_or(1, |id| id + 1);
        let next_comment_id = members
            .iter()
            .flat_map(|member| member.tasks.iter())
            .flat_map(|task| task.comments.iter())
            .map(|comment| comment.id)
            .max()
            .map_or(1, |id| id + 1);

        Self {
            clock,
            members,
            next_task_id,
            next_comment_id,
            status_filter: None,
            sort_by: MemberSort::Name,
            last_error: None,
        }
    }

    /// All members in seed order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Looks up one member by id.
    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == member_id)
    }

    /// Member list with the presentation filter and sort applied.
    pub fn visible_members(&self) -> Vec<&Member> {
        let mut visible: Vec<&Member> = self
            .members
            .iter()
            .filter(|member| {
                self.status_filter
                    .map_or(true, |status| member.status == status)
            })
            .collect();

        match self.sort_by {
            MemberSort::Name => visible.sort_by(|a, b| a.name.cmp(&b.name)),
            MemberSort::ActiveTasks => visible.sort_by(|a, b| {
                b.active_task_count()
                    .cmp(&a.active_task_count())
                    .then_with(|| a.name.cmp(&b.name))
            }),
        }

        visible
    }

    pub fn status_filter(&self) -> Option<MemberStatus> {
        self.status_filter
    }

    /// `None` means "All".
    pub fn set_status_filter(&mut self, filter: Option<MemberStatus>) {
        self.status_filter = filter;
    }

    pub fn sort_by(&self) -> MemberSort {
        self.sort_by
    }

    pub fn set_sort_by(&mut self, sort_by: MemberSort) {
        self.sort_by = sort_by;
    }

    /// Sets a member's presence status.
    pub fn update_member_status(
        &mut self,
        member_id: MemberId,
        status: MemberStatus,
    ) -> StoreResult<()> {
        let Some(index) = self.member_index(member_id) else {
            return self.fail(StoreError::MemberNotFound(member_id));
        };
        self.members[index].status = status;
        info!(
            "event=member_status module=team_store status=ok member_id={member_id} value={}",
            status.as_str()
        );
        Ok(())
    }

    /// Inactivity sweep: force a member offline unless already offline.
    pub fn auto_reset_status(&mut self, member_id: MemberId) -> StoreResult<()> {
        let Some(index) = self.member_index(member_id) else {
            return self.fail(StoreError::MemberNotFound(member_id));
        };
        if self.members[index].status != MemberStatus::Offline {
            self.members[index].status = MemberStatus::Offline;
        }
        Ok(())
    }

    /// Creates a task on the member's list and returns its id.
    pub fn assign_task(
        &mut self,
        member_id: MemberId,
        request: AssignTaskRequest,
    ) -> StoreResult<TaskId> {
        if request.estimated_hours <= 0.0 {
            return self.fail(StoreError::InvalidEstimate(request.estimated_hours));
        }
        let Some(index) = self.member_index(member_id) else {
            return self.fail(StoreError::MemberNotFound(member_id));
        };

        let now = self.clock.now();
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let member = &mut self.members[index];
        member.tasks.push(Task {
            id: task_id,
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            progress: 0,
            priority: request.priority,
            category: request.category,
            status: TaskStatus::NotStarted,
            estimated_hours: request.estimated_hours,
            assigned_by: request.assigned_by,
            assigned_to: member.name.clone(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            time_tracking: TimeTracking::default(),
            comments: Vec::new(),
            tags: Vec::new(),
        });

        info!("event=task_assigned module=team_store status=ok member_id={member_id} task_id={task_id}");
        Ok(task_id)
    }

    /// Applies a progress update, clamping arbitrary input into `0..=100`
    /// and recomputing status and the completion stamp.
    ///
    /// Reaching 100 while a tracking session is open forcibly closes the
    /// session and folds it into the total.
    pub fn update_task_progress(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        progress: i64,
    ) -> StoreResult<()> {
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };

        let now = self.clock.now();
        let clamped = clamp_progress(progress);
        let task = &mut self.members[member_index].tasks[task_index];
        task.apply_progress(clamped, now);
        if clamped == 100 && task.time_tracking.is_active {
            task.time_tracking.stop(now);
        }

        info!("event=task_progress module=team_store status=ok member_id={member_id} task_id={task_id} progress={clamped}");
        Ok(())
    }

    /// Marks a task fully complete; shorthand for a 100% progress update.
    pub fn complete_task(&mut self, member_id: MemberId, task_id: TaskId) -> StoreResult<()> {
        self.update_task_progress(member_id, task_id, 100)
    }

    /// Opens a tracking session on the target task.
    ///
    /// Any other active session for the same member is closed first; a
    /// `not_started` target is promoted to `in_progress`.
    pub fn start_time_tracking(&mut self, member_id: MemberId, task_id: TaskId) -> StoreResult<()> {
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };
        if self.members[member_index].tasks[task_index].time_tracking.is_active {
            return self.fail(StoreError::AlreadyTracking(task_id));
        }

        let now = self.clock.now();
        let member = &mut self.members[member_index];
        for other in member.tasks.iter_mut() {
            if other.time_tracking.is_active {
                other.time_tracking.stop(now);
                other.updated_at = now;
            }
        }

        let task = &mut member.tasks[task_index];
        task.time_tracking.start(now);
        if task.status == TaskStatus::NotStarted {
            task.status = TaskStatus::InProgress;
        }
        task.updated_at = now;

        info!("event=tracking_start module=team_store status=ok member_id={member_id} task_id={task_id}");
        Ok(())
    }

    /// Closes the open tracking session on the target task.
    pub fn stop_time_tracking(&mut self, member_id: MemberId, task_id: TaskId) -> StoreResult<()> {
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };
        if !self.members[member_index].tasks[task_index].time_tracking.is_active {
            return self.fail(StoreError::NotTracking(task_id));
        }

        let now = self.clock.now();
        let task = &mut self.members[member_index].tasks[task_index];
        task.time_tracking.stop(now);
        task.updated_at = now;

        info!("event=tracking_stop module=team_store status=ok member_id={member_id} task_id={task_id}");
        Ok(())
    }

    /// Appends an immutable comment and returns its id.
    pub fn add_task_comment(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> StoreResult<CommentId> {
        let text = text.into();
        if text.trim().is_empty() {
            return self.fail(StoreError::Validation(
                "comment text must not be empty".to_string(),
            ));
        }
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };

        let now = self.clock.now();
        let comment_id = self.next_comment_id;
        self.next_comment_id += 1;

        let task = &mut self.members[member_index].tasks[task_index];
        task.comments.push(Comment {
            id: comment_id,
            author: author.into(),
            text,
            timestamp: now,
        });
        task.updated_at = now;

        Ok(comment_id)
    }

    /// Replaces a task's priority.
    pub fn update_task_priority(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        priority: TaskPriority,
    ) -> StoreResult<()> {
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };
        let now = self.clock.now();
        let task = &mut self.members[member_index].tasks[task_index];
        task.priority = priority;
        task.updated_at = now;
        Ok(())
    }

    /// Replaces a task's category.
    pub fn update_task_category(
        &mut self,
        member_id: MemberId,
        task_id: TaskId,
        category: TaskCategory,
    ) -> StoreResult<()> {
        let Some((member_index, task_index)) = self.task_indexes(member_id, task_id) else {
            return self.fail(self.lookup_error(member_id, task_id));
        };
        let now = self.clock.now();
        let task = &mut self.members[member_index].tasks[task_index];
        task.category = category;
        task.updated_at = now;
        Ok(())
    }

    /// The most recent error, if not yet cleared.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Clears the error slot.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Records an error produced at the command boundary into this store's
    /// error slot.
    pub(crate) fn note_error(&mut self, error: StoreError) {
        warn!("event=store_reject module=team_store status=error error={error}");
        self.last_error = Some(error);
    }

    fn fail<T>(&mut self, error: StoreError) -> StoreResult<T> {
        self.note_error(error.clone());
        Err(error)
    }

    fn member_index(&self, member_id: MemberId) -> Option<usize> {
        self.members.iter().position(|member| member.id == member_id)
    }

    fn task_indexes(&self, member_id: MemberId, task_id: TaskId) -> Option<(usize, usize)> {
        let member_index = self.member_index(member_id)?;
        let task_index = self.members[member_index]
            .tasks
            .iter()
            .position(|task| task.id == task_id)?;
        Some((member_index, task_index))
    }

    /// Distinguishes a missing member from a missing task for error
    /// reporting.
    fn lookup_error(&self, member_id: MemberId, task_id: TaskId) -> StoreError {
        if self.member_index(member_id).is_none() {
            StoreError::MemberNotFound(member_id)
        } else {
            StoreError::TaskNotFound(task_id)
        }
    }
}
