use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use smarttasks_core::TaskId;

use crate::{
    error::{ReminderError, Result},
    types::ReminderConfig,
};

/// Time-ordered working set of reminders that have not fired yet.
///
/// Entries are keyed by `(trigger_time, task_id)` so iteration order is the
/// firing order, with ties broken by task id. A secondary index maps each task
/// to its trigger time, which keeps at most one entry per task and makes
/// removal by task id logarithmic.
///
/// The store has no locking of its own; the scheduler owns it inside its
/// critical section.
#[derive(Debug, Default)]
pub struct PendingReminderStore {
    by_time: BTreeMap<(DateTime<Utc>, TaskId), ReminderConfig>,
    by_task: HashMap<TaskId, DateTime<Utc>>,
}

impl PendingReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `config`, replacing any entry for the same task.
    ///
    /// Rejects trigger times at or before `now`.
    pub fn insert(&mut self, config: ReminderConfig, now: DateTime<Utc>) -> Result<()> {
        if config.trigger_time <= now {
            return Err(ReminderError::InvalidTriggerTime {
                task_id: config.task_id,
                trigger_time: config.trigger_time,
                now,
            });
        }
        self.remove_by_task_id(config.task_id);
        self.by_task.insert(config.task_id, config.trigger_time);
        self.by_time
            .insert((config.trigger_time, config.task_id), config);
        Ok(())
    }

    /// Remove the entry for `task_id`, if any.
    pub fn remove_by_task_id(&mut self, task_id: TaskId) -> Option<ReminderConfig> {
        let at = self.by_task.remove(&task_id)?;
        self.by_time.remove(&(at, task_id))
    }

    pub fn peek_earliest(&self) -> Option<&ReminderConfig> {
        self.by_time.values().next()
    }

    /// Remove and return every entry due at or before `now`, earliest first.
    pub fn pop_expired(&mut self, now: DateTime<Utc>) -> Vec<ReminderConfig> {
        let mut expired = Vec::new();
        while let Some(entry) = self.by_time.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let config = entry.remove();
            self.by_task.remove(&config.task_id);
            expired.push(config);
        }
        expired
    }

    pub fn get(&self, task_id: TaskId) -> Option<&ReminderConfig> {
        let at = self.by_task.get(&task_id)?;
        self.by_time.get(&(*at, task_id))
    }

    pub fn len(&self) -> usize {
        self.by_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_time.is_empty()
    }

    /// Entries in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ReminderConfig> {
        self.by_time.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn reminder(task_id: TaskId, secs: i64) -> ReminderConfig {
        let at = t0() + Duration::seconds(secs);
        ReminderConfig::new(task_id, format!("task {task_id}"), at, false)
    }

    #[test]
    fn earliest_is_smallest_trigger_time() {
        let mut store = PendingReminderStore::new();
        store.insert(reminder(1, 60), t0()).unwrap();
        store.insert(reminder(2, 30), t0()).unwrap();
        store.insert(reminder(3, 90), t0()).unwrap();

        assert_eq!(store.peek_earliest().map(|c| c.task_id), Some(2));
        let order: Vec<_> = store.iter().map(|c| c.task_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn equal_trigger_times_break_ties_by_task_id() {
        let mut store = PendingReminderStore::new();
        store.insert(reminder(9, 30), t0()).unwrap();
        store.insert(reminder(4, 30), t0()).unwrap();
        assert_eq!(store.peek_earliest().map(|c| c.task_id), Some(4));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert_rejects_now_and_past() {
        let mut store = PendingReminderStore::new();
        let err = store.insert(reminder(1, 0), t0()).unwrap_err();
        assert!(matches!(err, ReminderError::InvalidTriggerTime { task_id: 1, .. }));
        assert!(store.insert(reminder(1, -5), t0()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn insert_replaces_entry_for_same_task() {
        let mut store = PendingReminderStore::new();
        store.insert(reminder(1, 30), t0()).unwrap();
        store.insert(reminder(1, 120), t0()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(1).map(|c| c.trigger_time),
            Some(t0() + Duration::seconds(120))
        );
    }

    #[test]
    fn remove_by_task_id_is_noop_when_absent() {
        let mut store = PendingReminderStore::new();
        store.insert(reminder(1, 30), t0()).unwrap();
        assert!(store.remove_by_task_id(2).is_none());
        assert_eq!(store.remove_by_task_id(1).map(|c| c.task_id), Some(1));
        assert!(store.is_empty());
        assert!(store.get(1).is_none());
    }

    #[test]
    fn pop_expired_takes_due_entries_only() {
        let mut store = PendingReminderStore::new();
        store.insert(reminder(1, 5), t0()).unwrap();
        store.insert(reminder(2, 10), t0()).unwrap();
        store.insert(reminder(3, 50), t0()).unwrap();

        let expired = store.pop_expired(t0() + Duration::seconds(10));
        let ids: Vec<_> = expired.iter().map(|c| c.task_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.len(), 1);
        assert!(store.get(1).is_none());
        assert_eq!(store.peek_earliest().map(|c| c.task_id), Some(3));

        assert!(store.pop_expired(t0() + Duration::seconds(10)).is_empty());
    }
}
