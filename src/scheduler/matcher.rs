//! Due-time matching.
//!
//! The runner polls once per minute, so every schedule kind matches within
//! [`TOLERANCE_MINUTES`] of its nominal time rather than on the exact minute.
//! Repeated matches inside one window are collapsed by the occurrence lock.

use crate::scheduler::tasks::{IntervalUnit, Schedule};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Allowed distance, in minutes, between a nominal due time and `now`.
pub const TOLERANCE_MINUTES: u32 = 2;

/// Whether the time spec `time_spec` is due at `now`.
///
/// The spec is classified afresh on every call. Unrecognised specs are never due.
pub fn is_due(time_spec: &str, now: &NaiveDateTime) -> bool {
    Schedule::parse(time_spec).is_some_and(|schedule| schedule.is_due(now))
}

/// Whether two wall-clock times are within [`TOLERANCE_MINUTES`] of each other,
/// compared as minutes since midnight.
pub fn is_within_tolerance(hour: u32, min: u32, now_hour: u32, now_min: u32) -> bool {
    let target = i64::from(hour) * 60 + i64::from(min);
    let current = i64::from(now_hour) * 60 + i64::from(now_min);
    (target - current).abs() <= i64::from(TOLERANCE_MINUTES)
}

impl Schedule {
    /// Whether this schedule is due at `now`.
    pub fn is_due(&self, now: &NaiveDateTime) -> bool {
        match *self {
            Self::Daily { hour, min } => is_within_tolerance(hour, min, now.hour(), now.minute()),
            Self::Weekly { weekday, hour, min } => {
                now.weekday() == weekday
                    && is_within_tolerance(hour, min, now.hour(), now.minute())
            }
            Self::Once {
                year,
                month,
                day,
                hour,
                min,
            } => {
                now.year() == year
                    && now.month() == month
                    && now.day() == day
                    && is_within_tolerance(hour, min, now.hour(), now.minute())
            }
            Self::Interval { every, unit } => match unit {
                IntervalUnit::Minutes => minute_interval_due(every, now.minute()),
                IntervalUnit::Hours => hour_interval_due(every, now.hour(), now.minute()),
            },
        }
    }
}

/// Due when some minute within the tolerance window, taken modulo the hour,
/// is a multiple of `every`.
fn minute_interval_due(every: u64, now_min: u32) -> bool {
    let tolerance = i64::from(TOLERANCE_MINUTES);
    (-tolerance..=tolerance).any(|offset| {
        let minute = (i64::from(now_min) - offset).rem_euclid(60);
        minute.unsigned_abs() % every == 0
    })
}

/// Due in eligible hours near the top of the hour. Eligibility is decided by
/// the current hour alone, so `hh:58` of an eligible hour also matches.
fn hour_interval_due(every: u64, now_hour: u32, now_min: u32) -> bool {
    u64::from(now_hour) % every == 0
        && (now_min <= TOLERANCE_MINUTES || now_min >= 60 - TOLERANCE_MINUTES)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::NaiveDate;

    /// 2025-06-02 is a Monday.
    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn tolerance_boundaries() {
        assert!(is_within_tolerance(9, 30, 9, 30));
        assert!(is_within_tolerance(9, 30, 9, 28));
        assert!(is_within_tolerance(9, 30, 9, 32));
        assert!(!is_within_tolerance(9, 30, 9, 27));
        assert!(!is_within_tolerance(9, 30, 9, 33));
        assert!(is_within_tolerance(10, 0, 9, 59));
    }

    #[test]
    fn tolerance_does_not_wrap_midnight() {
        assert!(!is_within_tolerance(0, 0, 23, 59));
    }

    #[test]
    fn daily_matches_within_window() {
        assert!(is_due("09:00", &at(1, 9, 0)));
        assert!(is_due("09:00", &at(1, 8, 58)));
        assert!(is_due("09:00", &at(1, 9, 2)));
        assert!(!is_due("09:00", &at(1, 9, 3)));
        assert!(!is_due("09:00", &at(1, 8, 57)));
        assert!(!is_due("09:00", &at(1, 21, 0)));
    }

    #[test]
    fn weekly_requires_matching_day() {
        assert!(is_due("周一 14:00", &at(2, 14, 1)));
        assert!(!is_due("周一 14:00", &at(3, 14, 0)));
        assert!(!is_due("周一 14:00", &at(1, 14, 0)));
        assert!(!is_due("周一 14:00", &at(2, 14, 5)));
    }

    #[test]
    fn weekly_sunday_marker() {
        assert!(is_due("周日 08:00", &at(1, 8, 0)));
        assert!(!is_due("周日 08:00", &at(2, 8, 0)));
    }

    #[test]
    fn once_requires_exact_date() {
        assert!(is_due("2025-06-01 08:00", &at(1, 8, 0)));
        assert!(is_due("2025-06-01 08:00", &at(1, 8, 2)));
        assert!(!is_due("2025-06-01 08:00", &at(2, 8, 0)));
        assert!(!is_due("2025-05-31 08:00", &at(1, 8, 0)));
        assert!(!is_due("2024-06-01 08:00", &at(1, 8, 0)));
    }

    #[test]
    fn minute_interval_window() {
        assert!(is_due("每15分钟", &at(1, 10, 14)));
        assert!(is_due("每15分钟", &at(1, 10, 15)));
        assert!(is_due("每15分钟", &at(1, 10, 16)));
        assert!(is_due("每15分钟", &at(1, 10, 17)));
        assert!(!is_due("每15分钟", &at(1, 10, 18)));
        assert!(!is_due("每15分钟", &at(1, 10, 12)));
    }

    #[test]
    fn minute_interval_wraps_hour() {
        assert!(is_due("每30m", &at(1, 10, 59)));
        assert!(is_due("每30m", &at(1, 10, 1)));
        assert!(!is_due("每30m", &at(1, 10, 10)));
    }

    #[test]
    fn minute_interval_longer_than_hour_only_hits_top() {
        assert!(is_due("每90分钟", &at(1, 10, 0)));
        assert!(!is_due("每90分钟", &at(1, 10, 30)));
    }

    #[test]
    fn huge_intervals_only_hit_zero() {
        assert!(is_due("每99999999999m", &at(1, 10, 1)));
        assert!(!is_due("每99999999999m", &at(1, 10, 30)));
        assert!(is_due("每99999999999h", &at(1, 0, 2)));
        assert!(!is_due("每99999999999h", &at(1, 5, 0)));
    }

    #[test]
    fn hour_interval_top_of_eligible_hour() {
        assert!(is_due("每2小时", &at(1, 10, 0)));
        assert!(is_due("每2小时", &at(1, 10, 2)));
        assert!(!is_due("每2小时", &at(1, 10, 3)));
        assert!(!is_due("每2小时", &at(1, 11, 0)));
        assert!(is_due("每2h", &at(1, 0, 1)));
    }

    #[test]
    fn hour_interval_end_of_eligible_hour_matches() {
        assert!(is_due("每2h", &at(1, 10, 58)));
        assert!(!is_due("每2h", &at(1, 11, 58)));
    }

    #[test]
    fn unrecognised_spec_never_due() {
        assert!(!is_due("whenever", &at(1, 9, 0)));
        assert!(!is_due("每0分钟", &at(1, 9, 0)));
    }
}
