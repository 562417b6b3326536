//! Scheduled task definitions.
//!
//! Defines the [`Task`] row type and the [`Schedule`] enum that classifies a
//! task's raw time text into one of four recurrence kinds.

use crate::scheduler::active_hours::ActiveHours;
use chrono::Weekday;

/// Prefix marking an interval spec (`每30分钟`, `每2h`).
const INTERVAL_PREFIX: char = '每';

/// Prefix marking a weekly spec (`周一 09:00`).
const WEEKDAY_PREFIX: char = '周';

/// Unit of an interval schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    /// `分钟` or `m`.
    Minutes,
    /// `小时` or `h`.
    Hours,
}

impl IntervalUnit {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "分钟" | "m" => Some(Self::Minutes),
            "小时" | "h" => Some(Self::Hours),
            _ => None,
        }
    }
}

/// Recurrence kind of a task, derived from its time text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Daily,
    Weekly,
    Once,
    Interval,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Once => "once",
            Self::Interval => "interval",
        };
        f.write_str(label)
    }
}

/// When a task should run, parsed from its time text.
///
/// Hour and minute values are kept as written and are not range-checked:
/// `25:00` is a valid daily schedule that never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Every day at `hour:min` (`09:30`).
    Daily {
        hour: u32,
        min: u32,
    },
    /// Every week on `weekday` at `hour:min` (`周一 14:00`).
    Weekly {
        weekday: Weekday,
        hour: u32,
        min: u32,
    },
    /// A single calendar date at `hour:min` (`2025-06-01 08:00`).
    Once {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
    },
    /// Every `every` minutes or hours (`每30分钟`, `每2h`). `every` is never
    /// zero; counts beyond `u64::MAX` do not parse.
    Interval {
        every: u64,
        unit: IntervalUnit,
    },
}

impl Schedule {
    /// Classify a time spec. Returns `None` when no recognised syntax matches.
    ///
    /// The interval form is tried first since it is the most specific.
    pub fn parse(spec: &str) -> Option<Self> {
        parse_interval(spec)
            .or_else(|| parse_weekly(spec))
            .or_else(|| parse_once(spec))
            .or_else(|| parse_clock(spec).map(|(hour, min)| Self::Daily { hour, min }))
    }

    /// The recurrence kind of this schedule.
    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Daily { .. } => TaskType::Daily,
            Self::Weekly { .. } => TaskType::Weekly,
            Self::Once { .. } => TaskType::Once,
            Self::Interval { .. } => TaskType::Interval,
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { hour, min } => write!(f, "daily at {hour:02}:{min:02}"),
            Self::Weekly { weekday, hour, min } => {
                write!(f, "weekly on {weekday} at {hour:02}:{min:02}")
            }
            Self::Once {
                year,
                month,
                day,
                hour,
                min,
            } => write!(f, "once on {year:04}-{month:02}-{day:02} at {hour:02}:{min:02}"),
            Self::Interval { every, unit } => match unit {
                IntervalUnit::Minutes => write!(f, "every {every} minutes"),
                IntervalUnit::Hours => write!(f, "every {every} hours"),
            },
        }
    }
}

/// One row of the task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Raw time text as authored (`09:30`, `周一 14:00`, `每30分钟`).
    pub time: String,
    /// Task name. Also the namespace of the task's occurrence keys, so two
    /// rows with the same name share lock state.
    pub name: String,
    /// Skill reference, opaque to the scheduler (`-` for none).
    pub skill: String,
    /// Free-text description.
    pub desc: String,
    /// Parsed form of `time`.
    pub schedule: Schedule,
    /// Hour window taken from `desc`; `None` means always active.
    pub active_hours: Option<ActiveHours>,
}

impl Task {
    /// Recurrence kind, derived from the time text.
    pub fn task_type(&self) -> TaskType {
        self.schedule.task_type()
    }
}

/// Parse `H:MM` or `HH:MM`: one or two hour digits, exactly two minute digits.
pub(crate) fn parse_clock(text: &str) -> Option<(u32, u32)> {
    let (hour, min) = text.split_once(':')?;
    if !(1..=2).contains(&hour.len()) || min.len() != 2 {
        return None;
    }
    Some((parse_decimal(hour)?, parse_decimal(min)?))
}

/// Parse an all-ASCII-digit string as base 10. `"08"` is eight.
pub(crate) fn parse_decimal<T: std::str::FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_interval(spec: &str) -> Option<Schedule> {
    let rest = spec.strip_prefix(INTERVAL_PREFIX)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, marker) = rest.split_at(digits_end);
    let unit = IntervalUnit::from_marker(marker)?;
    let every: u64 = parse_decimal(digits)?;
    if every == 0 {
        return None;
    }
    Some(Schedule::Interval { every, unit })
}

fn parse_weekly(spec: &str) -> Option<Schedule> {
    let rest = spec.strip_prefix(WEEKDAY_PREFIX)?;
    let mut chars = rest.chars();
    let weekday = weekday_from_marker(chars.next()?)?;
    let clock = strip_separator(chars.as_str())?;
    let (hour, min) = parse_clock(clock)?;
    Some(Schedule::Weekly { weekday, hour, min })
}

fn parse_once(spec: &str) -> Option<Schedule> {
    let date = spec.get(..10)?;
    let clock = strip_separator(spec.get(10..)?)?;
    let mut parts = date.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if year.len() != 4 || month.len() != 2 || day.len() != 2 || parts.next().is_some() {
        return None;
    }
    let (hour, min) = parse_clock(clock)?;
    Some(Schedule::Once {
        year: parse_decimal(year)?,
        month: parse_decimal(month)?,
        day: parse_decimal(day)?,
        hour,
        min,
    })
}

/// Require at least one whitespace character before the clock part.
fn strip_separator(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    (trimmed.len() < text.len()).then_some(trimmed)
}

/// Map the character after `周` to a weekday. Sunday is `日`.
fn weekday_from_marker(marker: char) -> Option<Weekday> {
    match marker {
        '一' => Some(Weekday::Mon),
        '二' => Some(Weekday::Tue),
        '三' => Some(Weekday::Wed),
        '四' => Some(Weekday::Thu),
        '五' => Some(Weekday::Fri),
        '六' => Some(Weekday::Sat),
        '日' => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn parses_daily() {
        assert_eq!(
            Schedule::parse("09:30"),
            Some(Schedule::Daily { hour: 9, min: 30 })
        );
        assert_eq!(
            Schedule::parse("7:05"),
            Some(Schedule::Daily { hour: 7, min: 5 })
        );
    }

    #[test]
    fn leading_zero_is_decimal() {
        assert_eq!(
            Schedule::parse("08:09"),
            Some(Schedule::Daily { hour: 8, min: 9 })
        );
    }

    #[test]
    fn daily_requires_two_minute_digits() {
        assert_eq!(Schedule::parse("9:5"), None);
        assert_eq!(Schedule::parse("123:00"), None);
        assert_eq!(Schedule::parse("09:300"), None);
        assert_eq!(Schedule::parse("ab:cd"), None);
    }

    #[test]
    fn out_of_range_clock_still_parses() {
        assert_eq!(
            Schedule::parse("25:00"),
            Some(Schedule::Daily { hour: 25, min: 0 })
        );
    }

    #[test]
    fn parses_weekly() {
        assert_eq!(
            Schedule::parse("周一 14:00"),
            Some(Schedule::Weekly {
                weekday: Weekday::Mon,
                hour: 14,
                min: 0
            })
        );
        assert_eq!(
            Schedule::parse("周日  8:15"),
            Some(Schedule::Weekly {
                weekday: Weekday::Sun,
                hour: 8,
                min: 15
            })
        );
    }

    #[test]
    fn weekly_needs_separator_and_known_day() {
        assert_eq!(Schedule::parse("周一14:00"), None);
        assert_eq!(Schedule::parse("周八 14:00"), None);
        assert_eq!(Schedule::parse("周 14:00"), None);
    }

    #[test]
    fn parses_once() {
        assert_eq!(
            Schedule::parse("2025-06-01 08:00"),
            Some(Schedule::Once {
                year: 2025,
                month: 6,
                day: 1,
                hour: 8,
                min: 0
            })
        );
    }

    #[test]
    fn once_rejects_malformed_dates() {
        assert_eq!(Schedule::parse("2025-6-01 08:00"), None);
        assert_eq!(Schedule::parse("2025-06-01T08:00"), None);
        assert_eq!(Schedule::parse("2025-06-01"), None);
    }

    #[test]
    fn parses_interval_units() {
        assert_eq!(
            Schedule::parse("每30分钟"),
            Some(Schedule::Interval {
                every: 30,
                unit: IntervalUnit::Minutes
            })
        );
        assert_eq!(
            Schedule::parse("每15m"),
            Some(Schedule::Interval {
                every: 15,
                unit: IntervalUnit::Minutes
            })
        );
        assert_eq!(
            Schedule::parse("每2小时"),
            Some(Schedule::Interval {
                every: 2,
                unit: IntervalUnit::Hours
            })
        );
        assert_eq!(
            Schedule::parse("每3h"),
            Some(Schedule::Interval {
                every: 3,
                unit: IntervalUnit::Hours
            })
        );
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(Schedule::parse("每0分钟"), None);
        assert_eq!(Schedule::parse("每-5m"), None);
        assert_eq!(Schedule::parse("每m"), None);
        assert_eq!(Schedule::parse("每5天"), None);
        assert_eq!(Schedule::parse("每99999999999999999999m"), None);
    }

    #[test]
    fn large_interval_parses() {
        assert_eq!(
            Schedule::parse("每99999999999m"),
            Some(Schedule::Interval {
                every: 99_999_999_999,
                unit: IntervalUnit::Minutes
            })
        );
    }

    #[test]
    fn task_type_follows_schedule() {
        assert_eq!(Schedule::parse("09:30").unwrap().task_type(), TaskType::Daily);
        assert_eq!(
            Schedule::parse("周三 09:30").unwrap().task_type(),
            TaskType::Weekly
        );
        assert_eq!(
            Schedule::parse("2026-01-01 00:00").unwrap().task_type(),
            TaskType::Once
        );
        assert_eq!(
            Schedule::parse("每5m").unwrap().task_type(),
            TaskType::Interval
        );
    }

    #[test]
    fn schedule_display() {
        assert_eq!(Schedule::parse("9:05").unwrap().to_string(), "daily at 09:05");
        assert_eq!(
            Schedule::parse("周五 18:00").unwrap().to_string(),
            "weekly on Fri at 18:00"
        );
        assert_eq!(
            Schedule::parse("2025-06-01 8:00").unwrap().to_string(),
            "once on 2025-06-01 at 08:00"
        );
        assert_eq!(Schedule::parse("每2h").unwrap().to_string(), "every 2 hours");
        assert_eq!(
            Schedule::parse("每30分钟").unwrap().to_string(),
            "every 30 minutes"
        );
    }
}
