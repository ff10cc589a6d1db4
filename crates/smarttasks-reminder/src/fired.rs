use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    alarm::AlarmRecord,
    engine::ReminderScheduler,
    error::{ReminderError, Result},
    notify::Notifier,
    types::FireOutcome,
};

/// Reacts to the alarm facility delivering an armed alarm.
pub struct AlarmFiredHandler {
    scheduler: Arc<ReminderScheduler>,
    notifier: Arc<dyn Notifier>,
}

impl AlarmFiredHandler {
    pub fn new(scheduler: Arc<ReminderScheduler>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            scheduler,
            notifier,
        }
    }

    /// Validate `record`, let the scheduler consume the reminder and arm the
    /// next one, then notify the user if a reminder was actually due.
    pub fn handle(&self, record: &AlarmRecord) -> Result<FireOutcome> {
        validate(record)?;
        let outcome = self
            .scheduler
            .on_alarm_fired(record.task_id, record.trigger_time);
        if let Some(config) = outcome.consumed() {
            self.notifier.notify(config.task_id, &config.title);
        } else {
            debug!(task_id = record.task_id, "no notification for fire callback");
        }
        Ok(outcome)
    }

    /// Drain fired alarms until the queue closes or `shutdown` broadcasts `true`.
    pub async fn run(
        self,
        mut fired_rx: mpsc::Receiver<AlarmRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("alarm fired handler started");
        loop {
            tokio::select! {
                record = fired_rx.recv() => {
                    let Some(record) = record else {
                        info!("alarm queue closed; fired handler stopping");
                        break;
                    };
                    if let Err(e) = self.handle(&record) {
                        warn!(task_id = record.task_id, "discarding alarm: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("alarm fired handler shutting down");
                        break;
                    }
                }
            }
        }
    }
}

fn validate(record: &AlarmRecord) -> Result<()> {
    if record.task_id <= 0 {
        return Err(ReminderError::InvalidAlarmPayload(format!(
            "task id {} is not a stored task",
            record.task_id
        )));
    }
    if record.title.trim().is_empty() {
        return Err(ReminderError::InvalidAlarmPayload(format!(
            "alarm for task {} has no title",
            record.task_id
        )));
    }
    if record.trigger_time.timestamp_millis() <= 0 {
        return Err(ReminderError::InvalidAlarmPayload(format!(
            "alarm for task {} has no trigger time",
            record.task_id
        )));
    }
    Ok(())
}
