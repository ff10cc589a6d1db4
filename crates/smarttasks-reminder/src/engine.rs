use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use smarttasks_core::TaskId;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    alarm::{AlarmPort, AlarmRecord},
    clock::Clock,
    error::Result,
    notify::Notifier,
    schedule::successor_of,
    store::PendingReminderStore,
    types::{ArmedAlarm, FireOutcome, ReconcileReport, ReminderConfig, SchedulerStatus},
};

/// Everything guarded by the scheduler lock.
struct SchedulerState {
    store: PendingReminderStore,
    /// What the alarm facility currently holds for us, as far as we know.
    armed: Option<ArmedAlarm>,
}

/// Sole owner of the engine's alarm slot.
///
/// Every mutating entry point (`schedule`, `cancel`, `on_fired`, `reconcile`)
/// takes the same lock, mutates the pending store, and re-evaluates the head
/// of the store against the armed alarm before releasing it. Deciding the next
/// alarm and arming it are therefore one atomic step for every other caller.
///
/// Construct once and share as `Arc<ReminderScheduler>`.
pub struct ReminderScheduler {
    state: Mutex<SchedulerState>,
    alarm: Arc<dyn AlarmPort>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    status: watch::Sender<SchedulerStatus>,
}

impl ReminderScheduler {
    pub fn new(
        alarm: Arc<dyn AlarmPort>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (status, _) = watch::channel(SchedulerStatus::Healthy);
        Self {
            state: Mutex::new(SchedulerState {
                store: PendingReminderStore::new(),
                armed: None,
            }),
            alarm,
            notifier,
            clock,
            status,
        }
    }

    /// Schedule `config`, superseding any live reminder for the same task.
    ///
    /// A trigger time at or before now is rejected with `InvalidTriggerTime`,
    /// and an empty title with `InvalidReminder`, after the superseded
    /// reminder has been removed; nothing is armed for it and it is never
    /// fired.
    pub fn schedule(&self, config: ReminderConfig) -> Result<()> {
        let task_id = config.task_id;
        let trigger_time = config.trigger_time;

        let mut state = self.lock();
        let now = self.clock.now();
        let superseded = state.store.remove_by_task_id(task_id);
        let inserted = config
            .validate()
            .and_then(|()| state.store.insert(config, now));
        self.reevaluate_head(&mut state);
        drop(state);

        match inserted {
            Ok(()) => {
                debug!(
                    task_id,
                    trigger = %trigger_time,
                    superseded = superseded.is_some(),
                    "reminder scheduled"
                );
                Ok(())
            }
            Err(e) => {
                info!(task_id, trigger = %trigger_time, "reminder rejected: {e}");
                Err(e)
            }
        }
    }

    /// Drop the live reminder for `task_id`, if any.
    pub fn cancel(&self, task_id: TaskId) {
        let mut state = self.lock();
        let removed = state.store.remove_by_task_id(task_id);
        self.reevaluate_head(&mut state);
        drop(state);

        if removed.is_some() {
            debug!(task_id, "reminder cancelled");
        }
    }

    /// The alarm for `task_id` has fired.
    ///
    /// Consumes the pending reminder when it is due and schedules the 24-hour
    /// successor for repeating reminders. Callbacks for tasks with nothing
    /// pending, or whose pending reminder was moved to a later time, leave the
    /// store untouched.
    pub fn on_fired(&self, task_id: TaskId) -> FireOutcome {
        self.fire(task_id, None)
    }

    /// [`Self::on_fired`] for a callback that carries the trigger time its
    /// alarm was armed with.
    ///
    /// When that matches the armed alarm the facility slot is known to be
    /// empty, even if the callback arrived before the trigger time, so a
    /// reminder that is not due yet is armed again instead of being left
    /// without an alarm.
    pub fn on_alarm_fired(&self, task_id: TaskId, armed_for: DateTime<Utc>) -> FireOutcome {
        self.fire(task_id, Some(armed_for))
    }

    fn fire(&self, task_id: TaskId, armed_for: Option<DateTime<Utc>>) -> FireOutcome {
        let mut state = self.lock();
        let now = self.clock.now();

        // The facility delivered our alarm, so its slot is empty now.
        let delivered = state.armed.is_some_and(|a| {
            a.task_id == task_id
                && armed_for.map_or(a.trigger_time <= now, |t| a.trigger_time == t)
        });
        if delivered {
            state.armed = None;
        }

        let outcome = match state.store.get(task_id).cloned() {
            None => FireOutcome::NotPending,
            Some(config) if config.trigger_time > now => FireOutcome::NotDue(config),
            Some(config) => {
                state.store.remove_by_task_id(task_id);
                let successor = self.schedule_successor(&mut state, &config, now);
                FireOutcome::Consumed { config, successor }
            }
        };
        self.reevaluate_head(&mut state);
        drop(state);

        match &outcome {
            FireOutcome::Consumed { successor, .. } => {
                info!(
                    task_id,
                    next = ?successor.as_ref().map(|s| s.trigger_time),
                    "reminder fired"
                );
            }
            FireOutcome::NotPending => debug!(task_id, "fire callback with nothing pending"),
            FireOutcome::NotDue(config) => warn!(
                task_id,
                trigger = %config.trigger_time,
                "fire callback before pending reminder is due; ignored"
            ),
        }
        outcome
    }

    /// Correctness backstop for missed or duplicate alarm callbacks.
    ///
    /// Every reminder due at or before `now` is delivered as an implicit fire
    /// and discarded (repeating ones get their successor). A degraded arm is
    /// retried. With nothing expired and the right alarm armed this makes no
    /// alarm calls.
    pub fn reconcile(&self, now: DateTime<Utc>) -> ReconcileReport {
        let mut state = self.lock();
        let fired = state.store.pop_expired(now);
        let mut successors = Vec::new();
        for config in &fired {
            warn!(
                task_id = config.task_id,
                trigger = %config.trigger_time,
                "stale reminder discarded; delivering as implicit fire"
            );
            if let Some(next) = self.schedule_successor(&mut state, config, now) {
                successors.push(next);
            }
        }
        self.reevaluate_head(&mut state);
        drop(state);

        for config in &fired {
            self.notifier.notify(config.task_id, &config.title);
        }
        ReconcileReport { fired, successors }
    }

    /// Run [`Self::reconcile`] every `interval` until `shutdown` broadcasts `true`.
    pub async fn run_reconciler(
        self: Arc<Self>,
        interval: std::time::Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(interval_secs = interval.as_secs(), "reminder reconciler started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.reconcile(self.clock.now());
                    if !report.fired.is_empty() {
                        info!(
                            count = report.fired.len(),
                            "reconciliation delivered overdue reminders"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("reminder reconciler shutting down");
                        break;
                    }
                }
            }
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.borrow().clone()
    }

    /// Follow status changes (e.g. to surface a degraded alarm facility).
    pub fn subscribe_status(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.subscribe()
    }

    pub fn armed(&self) -> Option<ArmedAlarm> {
        self.lock().armed
    }

    /// Pending reminders in firing order.
    pub fn pending(&self) -> Vec<ReminderConfig> {
        self.lock().store.iter().cloned().collect()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // --- private helpers ---------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // Store and armed state stay consistent across a panic in a caller,
        // so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_successor(
        &self,
        state: &mut SchedulerState,
        fired: &ReminderConfig,
        now: DateTime<Utc>,
    ) -> Option<ReminderConfig> {
        let next = match successor_of(fired, now) {
            Ok(next) => next?,
            Err(e) => {
                error!(task_id = fired.task_id, "repeat successor rejected: {e}");
                return None;
            }
        };
        match state.store.insert(next.clone(), now) {
            Ok(()) => Some(next),
            Err(e) => {
                error!(task_id = fired.task_id, "repeat successor rejected: {e}");
                None
            }
        }
    }

    /// Make the armed alarm match the earliest pending reminder.
    ///
    /// Performs no alarm calls when the right alarm is already armed.
    fn reevaluate_head(&self, state: &mut SchedulerState) {
        let Some(head) = state.store.peek_earliest().cloned() else {
            if let Some(old) = state.armed.take() {
                self.alarm.disarm(old.task_id);
                debug!(task_id = old.task_id, "alarm disarmed; nothing pending");
            }
            self.set_status(SchedulerStatus::Healthy);
            return;
        };

        if state.armed.is_some_and(|a| a.targets(&head)) {
            return;
        }

        if let Some(old) = state.armed.take() {
            self.alarm.disarm(old.task_id);
        }

        match self.alarm.arm(&AlarmRecord::from(&head)) {
            Ok(()) => {
                state.armed = Some(ArmedAlarm {
                    task_id: head.task_id,
                    trigger_time: head.trigger_time,
                });
                info!(task_id = head.task_id, trigger = %head.trigger_time, "alarm armed");
                self.set_status(SchedulerStatus::Healthy);
            }
            Err(e) => {
                warn!(task_id = head.task_id, error = %e, "scheduling degraded: alarm refused");
                self.set_status(SchedulerStatus::Degraded {
                    task_id: head.task_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn set_status(&self, next: SchedulerStatus) {
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
