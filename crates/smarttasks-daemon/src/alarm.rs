//! In-process alarm facility backed by a tokio timer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use smarttasks_core::TaskId;
use smarttasks_reminder::{AlarmError, AlarmPort, AlarmRecord};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// Holds at most one pending timer; when it elapses the armed
/// [`AlarmRecord`] is pushed onto the fired-alarm queue.
///
/// Timers run on the monotonic clock, which may stall while the host is
/// suspended. Late fires are caught by the scheduler's reconcile pass.
pub struct TokioAlarm {
    fired_tx: mpsc::Sender<AlarmRecord>,
    slot: Mutex<Option<(TaskId, JoinHandle<()>)>>,
}

impl TokioAlarm {
    pub fn new(fired_tx: mpsc::Sender<AlarmRecord>) -> Self {
        Self {
            fired_tx,
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<(TaskId, JoinHandle<()>)>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AlarmPort for TokioAlarm {
    fn arm(&self, alarm: &AlarmRecord) -> Result<(), AlarmError> {
        let runtime = Handle::try_current().map_err(|e| AlarmError::Unsupported(e.to_string()))?;
        // Already due: fire on the next poll.
        let delay = (alarm.trigger_time - Utc::now())
            .to_std()
            .unwrap_or_default();

        let tx = self.fired_tx.clone();
        let record = alarm.clone();
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let task_id = record.task_id;
            if tx.send(record).await.is_err() {
                warn!(task_id, "fired-alarm queue closed; alarm dropped");
            }
        });

        if let Some((previous, old)) = self.slot().replace((alarm.task_id, timer)) {
            debug!(task_id = previous, "replacing armed timer");
            old.abort();
        }
        Ok(())
    }

    fn disarm(&self, task_id: TaskId) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|(armed, _)| *armed == task_id) {
            if let Some((_, timer)) = slot.take() {
                timer.abort();
            }
        }
    }
}
