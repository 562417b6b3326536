//! In-memory occurrence lock.
//!
//! The matcher reports a task as due on every poll inside its tolerance
//! window. [`OccurrenceLock`] turns that into at most one firing per
//! occurrence by recording an occurrence key the first time it is seen.
//! Keys are never pruned; their number is bounded by tasks × occurrences
//! per day.

use crate::scheduler::tasks::{IntervalUnit, Schedule, parse_clock};
use chrono::{NaiveDateTime, Timelike};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of occurrence keys that have already fired.
#[derive(Debug, Default)]
pub struct OccurrenceLock {
    fired: Mutex<HashSet<String>>,
}

impl OccurrenceLock {
    /// Create an empty lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the occurrence of `task_name` at `now`. Returns `true` when it
    /// was newly recorded, `false` when it has fired before.
    pub fn try_acquire(&self, task_name: &str, time_spec: &str, now: &NaiveDateTime) -> bool {
        let key = occurrence_key(task_name, time_spec, now);
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }

    /// Forget every recorded occurrence.
    pub fn clear(&self) {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of recorded occurrences.
    pub fn len(&self) -> usize {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing has fired yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the key identifying the occurrence of `task_name` that `now` falls in.
///
/// - minute intervals: `{name}|interval-{N}m-{slot}|{date}|{hour}`, one slot per `N` minutes
/// - hour intervals: `{name}|interval-{N}h-{slot}|{date}`, one slot per `N` hours
/// - everything else: `{name}|{H:MM}|{date}`, the clock text copied from the spec
pub fn occurrence_key(task_name: &str, time_spec: &str, now: &NaiveDateTime) -> String {
    let date = now.format("%Y-%m-%d");

    if let Some(Schedule::Interval { every, unit }) = Schedule::parse(time_spec) {
        return match unit {
            IntervalUnit::Minutes => {
                let slot = u64::from(now.minute()) / every * every;
                format!(
                    "{task_name}|interval-{every}m-{slot}|{date}|{}",
                    now.hour()
                )
            }
            IntervalUnit::Hours => {
                let slot = u64::from(now.hour()) / every * every;
                format!("{task_name}|interval-{every}h-{slot}|{date}")
            }
        };
    }

    let clock = time_spec
        .split_whitespace()
        .find(|token| parse_clock(token).is_some())
        .unwrap_or(time_spec);
    format!("{task_name}|{clock}|{date}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn daily_key_uses_spec_clock_and_date() {
        assert_eq!(
            occurrence_key("晨报", "09:00", &at(1, 9, 1)),
            "晨报|09:00|2025-06-01"
        );
        assert_eq!(
            occurrence_key("周报", "周五 18:00", &at(6, 17, 59)),
            "周报|18:00|2025-06-06"
        );
        assert_eq!(
            occurrence_key("提醒", "2025-06-01 8:00", &at(1, 8, 0)),
            "提醒|8:00|2025-06-01"
        );
    }

    #[test]
    fn minute_interval_key_floors_to_slot() {
        assert_eq!(
            occurrence_key("心跳", "每15分钟", &at(1, 10, 14)),
            "心跳|interval-15m-0|2025-06-01|10"
        );
        assert_eq!(
            occurrence_key("心跳", "每15分钟", &at(1, 10, 16)),
            "心跳|interval-15m-15|2025-06-01|10"
        );
    }

    #[test]
    fn hour_interval_key_floors_to_slot() {
        assert_eq!(
            occurrence_key("同步", "每3h", &at(1, 7, 0)),
            "同步|interval-3h-6|2025-06-01"
        );
    }

    #[test]
    fn unparseable_spec_keys_on_raw_text() {
        assert_eq!(
            occurrence_key("x", "sometime", &at(1, 7, 0)),
            "x|sometime|2025-06-01"
        );
    }

    #[test]
    fn acquire_once_per_occurrence() {
        let lock = OccurrenceLock::new();
        assert!(lock.try_acquire("晨报", "09:00", &at(1, 9, 1)));
        assert!(!lock.try_acquire("晨报", "09:00", &at(1, 9, 2)));
        assert!(lock.try_acquire("晨报", "09:00", &at(2, 9, 1)));
        assert_eq!(lock.len(), 2);
    }

    #[test]
    fn distinct_names_do_not_share_occurrences() {
        let lock = OccurrenceLock::new();
        assert!(lock.try_acquire("a", "09:00", &at(1, 9, 0)));
        assert!(lock.try_acquire("b", "09:00", &at(1, 9, 0)));
    }

    #[test]
    fn thirty_minute_interval_fires_once_per_slot() {
        let lock = OccurrenceLock::new();
        let fired: Vec<u32> = (0..60)
            .filter(|&min| lock.try_acquire("t", "每30分钟", &at(1, 10, min)))
            .collect();
        assert_eq!(fired, vec![0, 30]);
        assert!(lock.try_acquire("t", "每30分钟", &at(1, 11, 0)));
        assert!(lock.try_acquire("t", "每30分钟", &at(2, 10, 0)));
    }

    #[test]
    fn clear_resets_state() {
        let lock = OccurrenceLock::new();
        assert!(lock.try_acquire("t", "09:00", &at(1, 9, 0)));
        lock.clear();
        assert!(lock.is_empty());
        assert!(lock.try_acquire("t", "09:00", &at(1, 9, 0)));
    }
}
