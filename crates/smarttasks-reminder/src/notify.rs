use smarttasks_core::TaskId;

/// User-visible notification delivery.
///
/// Delivery is keyed by task: notifying twice for the same task replaces the
/// earlier notification rather than stacking a second one.
pub trait Notifier: Send + Sync {
    fn notify(&self, task_id: TaskId, title: &str);
}
