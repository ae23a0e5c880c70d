//! Task model and time-tracking history.
//!
//! # Responsibility
//! - Define the task record with priority, category, progress, comments,
//!   and the embedded time-tracking session log.
//! - Keep the progress/status invariant mapping in one place.
//!
//! # Invariants
//! - `progress` is always within `0..=100`.
//! - `progress == 100` implies `status == Completed` and `completed_at` set;
//!   reopening below 100 clears `completed_at`.
//! - `total_time_ms` only grows, by one closed session's duration at a time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-allocated monotonic task identifier.
pub type TaskId = u64;

/// Store-allocated monotonic comment identifier.
pub type CommentId = u64;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Urgency scale shared by tasks and notifications.
///
/// Variant order defines escalation order: `Low < Medium < High < Urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Parses a presentation-layer priority string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Fixed set of work categories tasks are bucketed into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Development,
    Design,
    Testing,
    Presentation,
    Research,
    Documentation,
    Meeting,
}

impl TaskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Design => "design",
            Self::Testing => "testing",
            Self::Presentation => "presentation",
            Self::Research => "research",
            Self::Documentation => "documentation",
            Self::Meeting => "meeting",
        }
    }

    /// Parses a presentation-layer category string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Self::Development),
            "design" => Some(Self::Design),
            "testing" => Some(Self::Testing),
            "presentation" => Some(Self::Presentation),
            "research" => Some(Self::Research),
            "documentation" => Some(Self::Documentation),
            "meeting" => Some(Self::Meeting),
            _ => None,
        }
    }
}

/// Task lifecycle state, always derived from progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Canonical progress-to-status mapping.
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => Self::NotStarted,
            100 => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

/// One closed interval of actively tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSession {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Per-task time-tracking state and session history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTracking {
    pub is_active: bool,
    /// Set while a session is open; cleared on stop.
    pub current_session_start: Option<DateTime<Utc>>,
    /// Accumulated closed-session time in milliseconds. Only ever grows.
    pub total_time_ms: i64,
    pub sessions: Vec<TrackingSession>,
}

impl TimeTracking {
    /// Opens a session at `now`.
    ///
    /// Callers must have rejected an already-active session first.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.current_session_start = Some(now);
    }

    /// Closes the open session at `now` and folds its duration into the
    /// running total. Returns the closed duration in milliseconds, or
    /// `None` when no session was open.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<i64> {
        let started_at = self.current_session_start?;
        let duration_ms = (now - started_at).num_milliseconds().max(0);
        self.sessions.push(TrackingSession {
            started_at,
            ended_at: now,
            duration_ms,
        });
        self.total_time_ms += duration_ms;
        self.is_active = false;
        self.current_session_start = None;
        Some(duration_ms)
    }
}

/// An immutable task comment, ordered by insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A unit of work owned by exactly one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    /// Always within `0..=100`.
    pub progress: u8,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub estimated_hours: f64,
    pub assigned_by: String,
    pub assigned_to: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_tracking: TimeTracking,
    pub comments: Vec<Comment>,
    pub tags: Vec<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.progress == 100
    }

    /// Tracked time converted to hours. Always derived from
    /// `total_time_ms`, never stored.
    pub fn actual_hours(&self) -> f64 {
        self.time_tracking.total_time_ms as f64 / MS_PER_HOUR
    }

    /// The instant a bare due date compares as: UTC midnight of that day.
    pub fn due_instant(&self) -> DateTime<Utc> {
        due_instant(self.due_date)
    }

    /// An incomplete task whose due instant has passed is overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_instant() < now
    }

    /// Applies an already-clamped progress value at `now`, recomputing
    /// status and the completion stamp.
    ///
    /// # Invariants
    /// - Reaching 100 sets `completed_at` once; it is kept on repeated
    ///   100-writes and cleared on any drop below 100 (reopening).
    pub fn apply_progress(&mut self, progress: u8, now: DateTime<Utc>) {
        self.progress = progress;
        self.status = TaskStatus::from_progress(progress);
        if progress == 100 {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.updated_at = now;
    }
}

/// Clamps an arbitrary presentation-layer progress value into `0..=100`.
pub fn clamp_progress(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// UTC midnight of a bare calendar date.
pub fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is valid for any date")
        .and_utc()
}
