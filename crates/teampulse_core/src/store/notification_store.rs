//! Notification store: durable log, ephemeral toast queue, delivery
//! settings.
//!
//! # Responsibility
//! - Keep the most-recent-first notification log and its unread counter.
//! - Maintain the capped toast queue with per-toast expiry schedules.
//!
//! # Invariants
//! - `unread_count` always equals the number of unread notifications.
//! - The toast queue never exceeds `max_toasts`; the oldest entries are
//!   evicted first.
//! - Icon and color are derived once at creation and frozen.

use crate::clock::{Clock, SystemClock};
use crate::model::notification::{
    color_for, icon_for, NewNotification, Notification, NotificationId, ToastNotification,
};
use crate::store::StoreError;
use chrono::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// User-configurable delivery settings.
///
/// In-memory only; values reset on process restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationSettings {
    pub enable_toasts: bool,
    pub enable_sounds: bool,
    pub auto_mark_read: bool,
    pub toast_duration_ms: i64,
    pub max_toasts: usize,
    pub enable_deadline_reminders: bool,
    pub enable_task_notifications: bool,
    pub enable_status_notifications: bool,
    pub enable_comment_notifications: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_toasts: true,
            enable_sounds: true,
            auto_mark_read: true,
            toast_duration_ms: 5_000,
            max_toasts: 5,
            enable_deadline_reminders: true,
            enable_task_notifications: true,
            enable_status_notifications: true,
            enable_comment_notifications: true,
        }
    }
}

/// Partial settings update; only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationSettingsPatch {
    pub enable_toasts: Option<bool>,
    pub enable_sounds: Option<bool>,
    pub auto_mark_read: Option<bool>,
    pub toast_duration_ms: Option<i64>,
    pub max_toasts: Option<usize>,
    pub enable_deadline_reminders: Option<bool>,
    pub enable_task_notifications: Option<bool>,
    pub enable_status_notifications: Option<bool>,
    pub enable_comment_notifications: Option<bool>,
}

const RETENTION_DAYS: i64 = 30;

/// In-memory notification state.
pub struct NotificationStore<C: Clock = SystemClock> {
    clock: C,
    /// Most recent first.
    notifications: Vec<Notification>,
    toasts: Vec<ToastNotification>,
    next_id: NotificationId,
    unread_count: usize,
    settings: NotificationSettings,
    last_error: Option<StoreError>,
}

impl NotificationStore<SystemClock> {
    /// Creates an empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for NotificationStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> NotificationStore<C> {
    /// Creates an empty store with an explicit time source.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            notifications: Vec::new(),
            toasts: Vec::new(),
            next_id: 1,
            unread_count: 0,
            settings: NotificationSettings::default(),
            last_error: None,
        }
    }

    /// Creates a notification, prepends it to the log, and (when enabled)
    /// enqueues its toast projection. Returns the new id.
    pub fn add(&mut self, request: NewNotification) -> NotificationId {
        let now = self.clock.now();
        let id = self.next_id;
        self.next_id += 1;

        let icon = icon_for(request.kind).to_string();
        let color = color_for(request.kind, request.priority);
        let notification = Notification {
            id,
            kind: request.kind,
            title: request.title,
            message: request.message,
            timestamp: now,
            is_read: request.auto_read,
            priority: request.priority,
            related_user: request.related_user,
            related_task: request.related_task,
            action_url: request.action_url,
            icon: icon.clone(),
            color,
        };

        if request.show_as_toast && self.settings.enable_toasts {
            self.toasts.push(ToastNotification {
                id: format!("toast-{id}"),
                kind: notification.kind,
                title: notification.title.clone(),
                message: notification.message.clone(),
                priority: notification.priority,
                icon,
                color,
                created_at: now,
            });
            // Keep only the most recent max_toasts entries.
            if self.toasts.len() > self.settings.max_toasts {
                let excess = self.toasts.len() - self.settings.max_toasts;
                self.toasts.drain(..excess);
            }
        }

        if !request.auto_read {
            self.unread_count += 1;
        }
        self.notifications.insert(0, notification);
        self.last_error = None;

        info!(
            "event=notification_added module=notification_store status=ok id={id} kind={}",
            request.kind.as_str()
        );
        id
    }

    /// Flips one notification to read. Unknown ids are ignored.
    pub fn mark_read(&mut self, id: NotificationId) {
        if let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
        {
            if !notification.is_read {
                notification.is_read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
            }
        }
    }

    /// Marks every notification read and zeroes the unread counter.
    pub fn mark_all_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.is_read = true;
        }
        self.unread_count = 0;
    }

    /// Removes one notification from the log. Unknown ids are ignored.
    pub fn remove(&mut self, id: NotificationId) {
        if let Some(index) = self
            .notifications
            .iter()
            .position(|notification| notification.id == id)
        {
            if !self.notifications[index].is_read {
                self.unread_count = self.unread_count.saturating_sub(1);
            }
            self.notifications.remove(index);
        }
    }

    /// Removes one toast; the underlying notification is untouched.
    pub fn remove_toast(&mut self, toast_id: &str) {
        self.toasts.retain(|toast| toast.id != toast_id);
    }

    /// Empties the log and zeroes the unread counter.
    pub fn clear_all(&mut self) {
        self.notifications.clear();
        self.unread_count = 0;
    }

    /// Removes notifications that are both read and older than the
    /// 30-day retention window. Unread history is retained regardless of
    /// age.
    pub fn clear_old(&mut self) {
        let cutoff = self.clock.now() - Duration::days(RETENTION_DAYS);
        self.notifications
            .retain(|notification| notification.timestamp >= cutoff || !notification.is_read);
    }

    /// Marks a batch read, adjusting the unread counter in one pass.
    pub fn bulk_mark_read(&mut self, ids: &[NotificationId]) {
        let mut marked = 0;
        for notification in self.notifications.iter_mut() {
            if ids.contains(&notification.id) && !notification.is_read {
                notification.is_read = true;
                marked += 1;
            }
        }
        self.unread_count = self.unread_count.saturating_sub(marked);
    }

    /// Removes a batch, adjusting the unread counter in one pass.
    pub fn bulk_remove(&mut self, ids: &[NotificationId]) {
        let mut removed_unread = 0;
        self.notifications.retain(|notification| {
            if ids.contains(&notification.id) {
                if !notification.is_read {
                    removed_unread += 1;
                }
                return false;
            }
            true
        });
        self.unread_count = self.unread_count.saturating_sub(removed_unread);
    }

    /// Drops every toast whose own lifetime has elapsed, each measured
    /// from its `created_at`. Returns how many were dropped.
    pub fn expire_toasts(&mut self) -> usize {
        let now = self.clock.now();
        let lifetime = Duration::milliseconds(self.settings.toast_duration_ms);
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.created_at + lifetime > now);
        before - self.toasts.len()
    }

    /// Applies a partial settings update.
    pub fn update_settings(&mut self, patch: NotificationSettingsPatch) {
        let settings = &mut self.settings;
        if let Some(value) = patch.enable_toasts {
            settings.enable_toasts = value;
        }
        if let Some(value) = patch.enable_sounds {
            settings.enable_sounds = value;
        }
        if let Some(value) = patch.auto_mark_read {
            settings.auto_mark_read = value;
        }
        if let Some(value) = patch.toast_duration_ms {
            settings.toast_duration_ms = value;
        }
        if let Some(value) = patch.max_toasts {
            settings.max_toasts = value;
        }
        if let Some(value) = patch.enable_deadline_reminders {
            settings.enable_deadline_reminders = value;
        }
        if let Some(value) = patch.enable_task_notifications {
            settings.enable_task_notifications = value;
        }
        if let Some(value) = patch.enable_status_notifications {
            settings.enable_status_notifications = value;
        }
        if let Some(value) = patch.enable_comment_notifications {
            settings.enable_comment_notifications = value;
        }
    }

    /// Full log, most recent first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Looks up one notification by id.
    pub fn notification(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications
            .iter()
            .find(|notification| notification.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Pending toasts, oldest first.
    pub fn toasts(&self) -> &[ToastNotification] {
        &self.toasts
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// The most recent error, if not yet cleared.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Clears the error slot.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Records an error produced at the command boundary.
    #[allow(dead_code)]
    pub(crate) fn note_error(&mut self, error: StoreError) {
        warn!("event=store_reject module=notification_store status=error error={error}");
        self.last_error = Some(error);
    }
}
