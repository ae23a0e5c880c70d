//! Notification model and styling derivation.
//!
//! # Responsibility
//! - Define the notification record and its transient toast projection.
//! - Derive icon/color deterministically from `(type, priority)` at
//!   creation time; both are frozen on the record afterwards.
//!
//! # Invariants
//! - A notification is mutated only by flipping `is_read`.
//! - Toast lifecycle is independent of the underlying notification.

use crate::model::task::{TaskId, TaskPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-allocated monotonic notification identifier.
pub type NotificationId = u64;

/// Event kinds surfaced to the notification center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskCompleted,
    TaskProgress,
    StatusChanged,
    DeadlineApproaching,
    CommentAdded,
    TimeTracking,
    MemberOnline,
    MemberOffline,
    PriorityChanged,
    CategoryChanged,
    SystemUpdate,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskCompleted => "task_completed",
            Self::TaskProgress => "task_progress",
            Self::StatusChanged => "status_changed",
            Self::DeadlineApproaching => "deadline_approaching",
            Self::CommentAdded => "comment_added",
            Self::TimeTracking => "time_tracking",
            Self::MemberOnline => "member_online",
            Self::MemberOffline => "member_offline",
            Self::PriorityChanged => "priority_changed",
            Self::CategoryChanged => "category_changed",
            Self::SystemUpdate => "system_update",
        }
    }
}

/// Badge colors the presentation layer maps to its theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationColor {
    Red,
    Orange,
    Gray,
    Blue,
    Green,
    Purple,
    Indigo,
    Yellow,
}

impl NotificationColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Indigo => "indigo",
            Self::Yellow => "yellow",
        }
    }
}

/// Fixed icon lookup per notification type.
pub fn icon_for(kind: NotificationType) -> &'static str {
    match kind {
        NotificationType::TaskAssigned => "📋",
        NotificationType::TaskCompleted => "✅",
        NotificationType::TaskProgress => "📈",
        NotificationType::StatusChanged => "🔄",
        NotificationType::DeadlineApproaching => "⏰",
        NotificationType::CommentAdded => "💬",
        NotificationType::TimeTracking => "⏱️",
        NotificationType::MemberOnline => "🟢",
        NotificationType::MemberOffline => "🔴",
        NotificationType::PriorityChanged => "🚨",
        NotificationType::CategoryChanged => "🏷️",
        NotificationType::SystemUpdate => "🔔",
    }
}

/// Fixed color lookup: priority takes precedence, then the per-type table
/// covers the medium tier.
pub fn color_for(kind: NotificationType, priority: TaskPriority) -> NotificationColor {
    match priority {
        TaskPriority::Urgent => return NotificationColor::Red,
        TaskPriority::High => return NotificationColor::Orange,
        TaskPriority::Low => return NotificationColor::Gray,
        TaskPriority::Medium => {}
    }

    match kind {
        NotificationType::TaskAssigned => NotificationColor::Blue,
        NotificationType::TaskCompleted => NotificationColor::Green,
        NotificationType::TaskProgress => NotificationColor::Purple,
        NotificationType::StatusChanged => NotificationColor::Indigo,
        NotificationType::DeadlineApproaching => NotificationColor::Red,
        NotificationType::CommentAdded => NotificationColor::Green,
        NotificationType::TimeTracking => NotificationColor::Yellow,
        NotificationType::MemberOnline => NotificationColor::Green,
        NotificationType::MemberOffline => NotificationColor::Gray,
        NotificationType::PriorityChanged => NotificationColor::Orange,
        NotificationType::CategoryChanged => NotificationColor::Blue,
        NotificationType::SystemUpdate => NotificationColor::Indigo,
    }
}

/// An entry in the durable notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub priority: TaskPriority,
    pub related_user: Option<String>,
    pub related_task: Option<TaskId>,
    pub action_url: Option<String>,
    /// Frozen at creation; not recomputed if the derivation tables change.
    pub icon: String,
    pub color: NotificationColor,
}

/// Payload for creating a notification.
///
/// Defaults: medium priority, shown as toast, not auto-read.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: TaskPriority,
    pub related_user: Option<String>,
    pub related_task: Option<TaskId>,
    pub action_url: Option<String>,
    pub show_as_toast: bool,
    pub auto_read: bool,
}

impl NewNotification {
    /// Starts a payload with the defaulted optional fields.
    pub fn new(
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            priority: TaskPriority::Medium,
            related_user: None,
            related_task: None,
            action_url: None,
            show_as_toast: true,
            auto_read: false,
        }
    }
}

/// Transient, auto-expiring projection of a notification.
///
/// Carries its own id and `created_at`; removing a toast never touches the
/// underlying notification, and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastNotification {
    /// Formatted `toast-<notification id>`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: TaskPriority,
    pub icon: String,
    pub color: NotificationColor,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{color_for, icon_for, NotificationColor, NotificationType};
    use crate::model::task::TaskPriority;

    #[test]
    fn priority_precedes_type_in_color_derivation() {
        assert_eq!(
            color_for(NotificationType::TaskCompleted, TaskPriority::Urgent),
            NotificationColor::Red
        );
        assert_eq!(
            color_for(NotificationType::TaskCompleted, TaskPriority::High),
            NotificationColor::Orange
        );
        assert_eq!(
            color_for(NotificationType::TaskCompleted, TaskPriority::Low),
            NotificationColor::Gray
        );
    }

    #[test]
    fn medium_priority_falls_back_to_type_colors() {
        assert_eq!(
            color_for(NotificationType::TaskAssigned, TaskPriority::Medium),
            NotificationColor::Blue
        );
        assert_eq!(
            color_for(NotificationType::TaskProgress, TaskPriority::Medium),
            NotificationColor::Purple
        );
        assert_eq!(
            color_for(NotificationType::MemberOffline, TaskPriority::Medium),
            NotificationColor::Gray
        );
    }

    #[test]
    fn every_type_has_an_icon() {
        for kind in [
            NotificationType::TaskAssigned,
            NotificationType::TaskCompleted,
            NotificationType::TaskProgress,
            NotificationType::StatusChanged,
            NotificationType::DeadlineApproaching,
            NotificationType::CommentAdded,
            NotificationType::TimeTracking,
            NotificationType::MemberOnline,
            NotificationType::MemberOffline,
            NotificationType::PriorityChanged,
            NotificationType::CategoryChanged,
            NotificationType::SystemUpdate,
        ] {
            assert!(!icon_for(kind).is_empty());
        }
    }

    #[test]
    fn wire_names_use_snake_case() {
        assert_eq!(NotificationType::TaskAssigned.as_str(), "task_assigned");
        assert_eq!(
            NotificationType::DeadlineApproaching.as_str(),
            "deadline_approaching"
        );
        assert_eq!(NotificationType::MemberOnline.as_str(), "member_online");
    }
}
