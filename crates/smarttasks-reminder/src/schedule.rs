use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{ReminderError, Result},
    types::ReminderConfig,
};

/// Fixed cadence of repeating reminders.
pub const REPEAT_INTERVAL_HOURS: i64 = 24;

pub fn repeat_interval() -> Duration {
    Duration::hours(REPEAT_INTERVAL_HOURS)
}

/// Compute the first repeat occurrence of `fired_at` that lies strictly after `now`.
///
/// Normally this is `fired_at + 24h`. When the engine was asleep for longer
/// than a day the skipped occurrences are not replayed; the result is advanced
/// in whole intervals until it is in the future. `None` when the result is
/// not representable.
pub fn next_repeat(fired_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let step = repeat_interval();
    let mut next = fired_at.checked_add_signed(step)?;
    if next <= now {
        let behind = (now - next).num_seconds() / step.num_seconds() + 1;
        let catch_up = i32::try_from(behind)
            .ok()
            .and_then(|n| step.checked_mul(n))?;
        next = next.checked_add_signed(catch_up)?;
    }
    Some(next)
}

/// The successor of a fired reminder, or `None` for one-shot reminders.
pub fn successor_of(
    config: &ReminderConfig,
    now: DateTime<Utc>,
) -> Result<Option<ReminderConfig>> {
    if !config.repeat {
        return Ok(None);
    }
    let next = next_repeat(config.trigger_time, now).ok_or_else(|| {
        ReminderError::InvalidReminder(format!(
            "repeat of task {} after {} is out of range",
            config.task_id, config.trigger_time
        ))
    })?;
    Ok(Some(config.rescheduled(next)))
}
