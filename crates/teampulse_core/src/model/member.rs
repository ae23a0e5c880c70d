//! Team member model.
//!
//! # Responsibility
//! - Define the member record owning its task list.
//! - Provide status parsing at the presentation string boundary.
//!
//! # Invariants
//! - A task belongs to exactly one member for its whole lifetime.
//! - Members are created at seed time and never deleted in-session.

use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// Stable member identifier allocated at seed time.
pub type MemberId = u64;

/// Presence status a member can be in.
///
/// Serialized as the capitalized variant name to match the external data
/// the presentation layer was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Working,
    Break,
    Meeting,
    Offline,
}

impl MemberStatus {
    /// Returns the canonical display/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::Break => "Break",
            Self::Meeting => "Meeting",
            Self::Offline => "Offline",
        }
    }

    /// Parses a presentation-layer status string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Working" => Some(Self::Working),
            "Break" => Some(Self::Break),
            "Meeting" => Some(Self::Meeting),
            "Offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

/// A team participant with a presence status and owned tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Stable id used for lookup; the name is assumed unique but not canonical.
    pub id: MemberId,
    pub name: String,
    pub status: MemberStatus,
    /// Opaque reference resolved by the presentation layer.
    pub avatar_ref: Option<String>,
    pub tasks: Vec<Task>,
}

impl Member {
    /// Creates a member with an empty task list.
    pub fn new(id: MemberId, name: impl Into<String>, status: MemberStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            avatar_ref: None,
            tasks: Vec::new(),
        }
    }

    /// Finds an owned task by id.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Mutable variant of [`Member::task`].
    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    /// Number of tasks not yet completed; the `ActiveTasks` sort key.
    pub fn active_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_completed()).count()
    }

    /// The task currently being time-tracked, if any.
    pub fn active_tracking_task(&self) -> Option<&Task> {
        self.tasks.iter().find(|task| task.time_tracking.is_active)
    }
}
