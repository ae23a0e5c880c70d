//! Core state and analytics for the TeamPulse dashboard.
//! This crate is the single source of truth for business invariants.

pub mod analytics;
pub mod clock;
pub mod logging;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;

pub use analytics::config::{
    AnalyticsConfig, AnalyticsFilters, ChartType, DatePreset, DateRange, ExportFormat,
    ViewSettings,
};
pub use analytics::engine::{compute_analytics, AnalyticsEngine};
pub use analytics::metrics::{
    AnalyticsSnapshot, CategoryMetrics, DeadlineAnalytics, MemberMetrics, PriorityMetrics,
    TeamOverview,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberId, MemberStatus};
pub use model::notification::{
    NewNotification, Notification, NotificationColor, NotificationId, NotificationType,
    ToastNotification,
};
pub use model::task::{
    Comment, CommentId, Task, TaskCategory, TaskId, TaskPriority, TaskStatus, TimeTracking,
    TrackingSession,
};
pub use service::dashboard::{Command, Dashboard};
pub use store::notification_store::{
    NotificationSettings, NotificationSettingsPatch, NotificationStore,
};
pub use store::team_store::{AssignTaskRequest, MemberSort, TeamStore};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
