use std::sync::Arc;

use smarttasks_core::{Task, TaskEvent, TaskEventKind};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{engine::ReminderScheduler, error::Result, types::ReminderConfig};

/// Event kinds the bridge needs from the task store.
pub const BRIDGE_EVENT_KINDS: [TaskEventKind; 4] = [
    TaskEventKind::Added,
    TaskEventKind::Updated,
    TaskEventKind::Deleted,
    TaskEventKind::CompletionChanged,
];

/// Outcome of re-seeding the scheduler from the task store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReseedReport {
    pub scheduled: usize,
    /// Open tasks with a start time that could not be scheduled (past or invalid).
    pub skipped: usize,
}

/// Translates task lifecycle events into scheduler calls.
pub struct TaskLifecycleBridge {
    scheduler: Arc<ReminderScheduler>,
}

impl TaskLifecycleBridge {
    pub fn new(scheduler: Arc<ReminderScheduler>) -> Self {
        Self { scheduler }
    }

    /// Apply one event.
    ///
    /// Updates always cancel first so that clearing a start time, or
    /// completing a task, also clears its armed reminder.
    pub fn handle(&self, event: &TaskEvent) -> Result<()> {
        match event {
            TaskEvent::Added { task } => self.schedule_if_wanted(task),
            TaskEvent::Updated { task } | TaskEvent::CompletionChanged { task } => {
                self.scheduler.cancel(task.id);
                self.schedule_if_wanted(task)
            }
            TaskEvent::Deleted { task_id } => {
                self.scheduler.cancel(*task_id);
                Ok(())
            }
        }
    }

    /// Schedule reminders for every open task with a future start time.
    ///
    /// The pending store only lives in memory, so this is called once at
    /// startup with the persisted task list.
    pub fn reseed(&self, tasks: &[Task]) -> ReseedReport {
        let mut report = ReseedReport::default();
        for task in tasks.iter().filter(|t| t.wants_reminder()) {
            match self.schedule_if_wanted(task) {
                Ok(()) => report.scheduled += 1,
                Err(e) => {
                    debug!(task_id = task.id, "not re-seeded: {e}");
                    report.skipped += 1;
                }
            }
        }
        info!(
            scheduled = report.scheduled,
            skipped = report.skipped,
            "reminders re-seeded from task store"
        );
        report
    }

    /// Apply events in publication order until the stream ends or
    /// `shutdown` broadcasts `true`. A failing event is logged and skipped.
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<TaskEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("task lifecycle bridge started");
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("task event stream closed; bridge stopping");
                        break;
                    };
                    if let Err(e) = self.handle(&event) {
                        warn!(
                            task_id = event.task_id(),
                            kind = ?event.kind(),
                            "task event not applied: {e}"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("task lifecycle bridge shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn schedule_if_wanted(&self, task: &Task) -> Result<()> {
        if !task.wants_reminder() {
            return Ok(());
        }
        self.scheduler.schedule(ReminderConfig::from_task(task)?)
    }
}
