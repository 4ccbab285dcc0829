//! Dismissible notifications.
//!
//! Every outcome the user should see (success, refused operation, remote
//! failure) ends up as a [`Notification`] in a [`Notifications`] queue. The
//! host drains the queue and renders it however it likes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl Level {
    /// Title shown on the notification card.
    pub const fn title(self) -> &'static str {
        match self {
            Level::Success => "Success",
            Level::Warning => "Warning",
            Level::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: &'static str,
    pub message: String,
}

/// Pending notifications, oldest first.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Success => log::info!("{message}"),
            Level::Warning => log::warn!("{message}"),
            Level::Error => log::error!("{message}"),
        }
        self.queue.push(Notification {
            level,
            title: level.title(),
            message,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.queue
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.last()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Dismiss one notification by position.
    pub fn dismiss(&mut self, index: usize) -> Option<Notification> {
        (index < self.queue.len()).then(|| self.queue.remove(index))
    }

    /// Take every pending notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }
}
