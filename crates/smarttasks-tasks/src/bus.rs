use std::sync::{Mutex, PoisonError};

use smarttasks_core::{TaskEvent, TaskEventKind};
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    kinds: Vec<TaskEventKind>,
    tx: mpsc::UnboundedSender<TaskEvent>,
}

/// Fan-out of task events to typed subscribers.
///
/// Each subscriber names the event kinds it wants and receives them on its own
/// unbounded queue, in publication order. Nothing is dropped for a slow
/// subscriber; a subscriber whose receiver is gone is pruned on the next publish.
#[derive(Default)]
pub struct TaskEventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl TaskEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every future event whose kind is in `kinds`.
    pub fn subscribe(&self, kinds: &[TaskEventKind]) -> mpsc::UnboundedReceiver<TaskEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(Subscriber {
            kinds: kinds.to_vec(),
            tx,
        });
        rx
    }

    /// Deliver `event` to every interested subscriber. Returns how many got it.
    pub fn publish(&self, event: TaskEvent) -> usize {
        let kind = event.kind();
        let mut subscribers = self.lock();
        subscribers.retain(|s| !s.tx.is_closed());

        let mut delivered = 0;
        for subscriber in subscribers.iter().filter(|s| s.kinds.contains(&kind)) {
            if subscriber.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        debug!(?kind, task_id = event.task_id(), delivered, "task event published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
