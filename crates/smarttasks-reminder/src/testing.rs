//! Recording fakes shared by the unit tests in this crate.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use smarttasks_core::TaskId;

use crate::{
    alarm::{AlarmError, AlarmPort, AlarmRecord},
    clock::ManualClock,
    engine::ReminderScheduler,
    notify::Notifier,
    types::ReminderConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmCall {
    Arm(TaskId, DateTime<Utc>),
    Disarm(TaskId),
}

/// Alarm facility that records every call and can be told to refuse arming.
#[derive(Default)]
pub struct RecordingAlarm {
    calls: Mutex<Vec<AlarmCall>>,
    armed: Mutex<Option<AlarmRecord>>,
    refuse: Mutex<Option<AlarmError>>,
}

impl RecordingAlarm {
    pub fn calls(&self) -> Vec<AlarmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn armed(&self) -> Option<AlarmRecord> {
        self.armed.lock().unwrap().clone()
    }

    pub fn refuse_with(&self, error: Option<AlarmError>) {
        *self.refuse.lock().unwrap() = error;
    }

    /// Simulate the facility delivering the armed alarm: the slot empties.
    pub fn take_fired(&self) -> Option<AlarmRecord> {
        self.armed.lock().unwrap().take()
    }
}

impl AlarmPort for RecordingAlarm {
    fn arm(&self, alarm: &AlarmRecord) -> Result<(), AlarmError> {
        self.calls
            .lock()
            .unwrap()
            .push(AlarmCall::Arm(alarm.task_id, alarm.trigger_time));
        if let Some(err) = self.refuse.lock().unwrap().clone() {
            return Err(err);
        }
        *self.armed.lock().unwrap() = Some(alarm.clone());
        Ok(())
    }

    fn disarm(&self, task_id: TaskId) {
        self.calls.lock().unwrap().push(AlarmCall::Disarm(task_id));
        let mut armed = self.armed.lock().unwrap();
        if armed.as_ref().is_some_and(|a| a.task_id == task_id) {
            *armed = None;
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(TaskId, String)>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<(TaskId, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, task_id: TaskId, title: &str) {
        self.delivered
            .lock()
            .unwrap()
            .push((task_id, title.to_string()));
    }
}

/// A scheduler wired to recording fakes and a manual clock at [`t0`].
pub struct Harness {
    pub scheduler: Arc<ReminderScheduler>,
    pub alarm: Arc<RecordingAlarm>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let alarm = Arc::new(RecordingAlarm::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(t0()));
        let scheduler = Arc::new(ReminderScheduler::new(
            alarm.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        Self {
            scheduler,
            alarm,
            notifier,
            clock,
        }
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

pub fn secs(n: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(n)
}

pub fn reminder(task_id: TaskId, at_secs: i64) -> ReminderConfig {
    ReminderConfig::new(task_id, format!("task {task_id}"), secs(at_secs), false)
}
