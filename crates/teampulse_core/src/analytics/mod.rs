//! Derived-metrics computation over the entity store.
//!
//! # Responsibility
//! - Compute aggregate team/member/category/priority/deadline metrics
//!   from a member snapshot, a date range, and a filter set.
//! - Cache the result behind an explicit invalidate/recompute pair; no
//!   implicit reactive graph.
//!
//! # Invariants
//! - `compute_analytics` is a pure function of its inputs: identical
//!   inputs (including `now`) produce identical output.
//! - One malformed or incomplete record never blanks the whole report;
//!   non-admissible tasks are simply excluded.

pub mod config;
pub mod engine;
pub mod metrics;
