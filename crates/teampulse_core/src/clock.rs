//! Time source seam for stores and services.
//!
//! # Responsibility
//! - Supply "now" to every mutation path that stamps timestamps.
//! - Keep wall-clock access behind a trait so tests control time.
//!
//! # Invariants
//! - `Clock::now` must be monotone per clock instance only as far as the
//!   underlying source is; callers must not assume strict monotonicity.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Time source consumed by stores and services.
pub trait Clock {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and demos.
///
/// Clones share the same underlying instant, so one handle can drive the
/// stores while another advances time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a manual clock pinned to the given instant.
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(instant.timestamp_millis())),
        }
    }

    /// Moves the clock forward by whole milliseconds.
    pub fn advance_ms(&self, delta_ms: i64) {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Repins the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.epoch_ms
            .store(instant.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.epoch_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
