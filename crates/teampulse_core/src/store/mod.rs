//! State stores for the dashboard core.
//!
//! # Responsibility
//! - Own the authoritative member/task tree and the notification log.
//! - Expose mutation operations that fail with typed, recoverable errors.
//!
//! # Invariants
//! - All mutation goes through the store operations; failed operations
//!   leave state unchanged.
//! - Each store retains only its most recent error in a single slot,
//!   overwritten by the next failure and cleared explicitly.

use crate::model::member::MemberId;
use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod notification_store;
pub mod team_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable domain errors shared by both stores and the command layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    MemberNotFound(MemberId),
    TaskNotFound(TaskId),
    /// A presentation-layer string is not a member of its enumerated set.
    InvalidEnumValue {
        field: &'static str,
        value: String,
    },
    AlreadyTracking(TaskId),
    NotTracking(TaskId),
    /// Estimated hours must be positive.
    InvalidEstimate(f64),
    /// Form-level input rejection (empty title, past due date, blank
    /// comment text).
    Validation(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidEnumValue { field, value } => {
                write!(f, "invalid {field} value: `{value}`")
            }
            Self::AlreadyTracking(id) => {
                write!(f, "time tracking already active for task {id}")
            }
            Self::NotTracking(id) => {
                write!(f, "time tracking not active for task {id}")
            }
            Self::InvalidEstimate(hours) => {
                write!(f, "estimated hours must be positive, got {hours}")
            }
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl Error for StoreError {}
