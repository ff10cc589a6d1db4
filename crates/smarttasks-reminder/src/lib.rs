//! `smarttasks-reminder`: decides which single alarm is armed for the
//! reminders of a changing task set.
//!
//! # Overview
//!
//! Reminders live in an in-memory [`store::PendingReminderStore`] ordered by
//! trigger time. The [`engine::ReminderScheduler`] keeps exactly one alarm
//! armed through an [`alarm::AlarmPort`]: the one for the earliest pending
//! reminder. Task lifecycle events reach it through
//! [`bridge::TaskLifecycleBridge`], fired alarms through
//! [`fired::AlarmFiredHandler`], and a periodic reconcile pass repairs missed
//! or duplicate callbacks.
//!
//! # Entry points
//!
//! | Call        | Effect                                                  |
//! |-------------|---------------------------------------------------------|
//! | `schedule`  | Supersede-or-insert a reminder for a task               |
//! | `cancel`    | Drop a task's reminder                                  |
//! | `on_fired`  | Consume a fired reminder, schedule its 24 h successor   |
//! | `on_alarm_fired` | Same, matched against the alarm's armed trigger time |
//! | `reconcile` | Deliver overdue reminders, retry a degraded alarm       |

pub mod alarm;
pub mod bridge;
pub mod clock;
pub mod engine;
pub mod error;
pub mod fired;
pub mod notify;
pub mod schedule;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use alarm::{AlarmError, AlarmPort, AlarmRecord};
pub use bridge::{ReseedReport, TaskLifecycleBridge, BRIDGE_EVENT_KINDS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::ReminderScheduler;
pub use error::{ReminderError, Result};
pub use fired::AlarmFiredHandler;
pub use notify::Notifier;
pub use types::{ArmedAlarm, FireOutcome, ReconcileReport, ReminderConfig, SchedulerStatus};
