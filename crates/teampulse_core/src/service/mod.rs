//! Orchestration layer over the stores.
//!
//! # Responsibility
//! - Accept presentation-layer commands, apply the entity-store mutation,
//!   and derive notifications from the state delta.
//! - Keep the stores unaware of each other; only this layer sees both.
//!
//! # Invariants
//! - Pre-mutation state is read before the store call; threshold
//!   notifications compare against the previously stored value, never a
//!   running flag.

pub mod dashboard;
