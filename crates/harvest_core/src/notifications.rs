//! Notices raised by exports that finished without a usable artifact.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Older notices are dropped once the store holds this many.
pub const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// The request produced nothing, e.g. an empty dataset.
    Info,
    /// The artifact was kept but a follow-up step failed.
    Warning,
}

#[derive(Debug, Clone)]
pub struct AppNotification {
    pub notification_type: NotificationType,
    pub title: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AppNotification {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Warning, message)
    }

    fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            title: None,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Newest-first notice log, bounded by [`MAX_NOTIFICATIONS`].
#[derive(Debug, Default)]
pub struct NotificationStore {
    notifications: VecDeque<AppNotification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: AppNotification) {
        self.notifications.push_front(notification);
        self.notifications.truncate(MAX_NOTIFICATIONS);
    }

    pub fn latest(&self) -> Option<&AppNotification> {
        self.notifications.front()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
