use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use smarttasks_core::TaskId;
use smarttasks_reminder::Notifier;
use tracing::info;

/// A delivered reminder waiting for the user to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub task_id: TaskId,
    pub title: String,
    pub message: String,
    pub delivered_at: DateTime<Utc>,
}

/// Latest notification per task, polled over HTTP.
///
/// A second delivery for the same task replaces the first.
#[derive(Default)]
pub struct NotificationInbox {
    entries: DashMap<TaskId, Notification>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub fn list(&self) -> Vec<Notification> {
        let mut all: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.delivered_at.cmp(&a.delivered_at).then(a.task_id.cmp(&b.task_id)));
        all
    }

    /// Remove the notification for `task_id`. Returns false if there was none.
    pub fn dismiss(&self, task_id: TaskId) -> bool {
        self.entries.remove(&task_id).is_some()
    }
}

impl Notifier for NotificationInbox {
    fn notify(&self, task_id: TaskId, title: &str) {
        let message = format!("Task starting now: {title}");
        info!(task_id, %title, "reminder delivered");
        self.entries.insert(
            task_id,
            Notification {
                task_id,
                title: title.to_string(),
                message,
                delivered_at: Utc::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_delivery_replaces_notification() {
        let inbox = NotificationInbox::new();
        inbox.notify(1, "stretch");
        inbox.notify(1, "stretch again");
        inbox.notify(2, "call mom");

        let all = inbox.list();
        assert_eq!(all.len(), 2);
        let first = all.iter().find(|n| n.task_id == 1).unwrap();
        assert_eq!(first.title, "stretch again");
        assert_eq!(first.message, "Task starting now: stretch again");
    }

    #[test]
    fn dismiss_reports_presence() {
        let inbox = NotificationInbox::new();
        inbox.notify(1, "stretch");
        assert!(inbox.dismiss(1));
        assert!(!inbox.dismiss(1));
        assert!(inbox.list().is_empty());
    }
}
