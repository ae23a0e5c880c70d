//! Domain model for the team dashboard.
//!
//! # Responsibility
//! - Define the canonical member/task/notification shapes shared by the
//!   stores, the analytics engine, and the orchestration layer.
//! - Keep invariant-preserving lifecycle helpers next to the data.
//!
//! # Invariants
//! - Every entity is identified by a store-allocated monotonic integer id.
//! - Task status is derived from progress; the helpers here are the only
//!   place that mapping is written down.

pub mod member;
pub mod notification;
pub mod task;
