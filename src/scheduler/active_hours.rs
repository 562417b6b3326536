//! Per-task active-hours window.
//!
//! A task description may carry `活跃时段 HH:MM-HH:MM`; outside that hour
//! range a due task is suppressed. Only the hour components are used.

use crate::scheduler::tasks::parse_decimal;
use chrono::{NaiveDateTime, Timelike};

/// Marker introducing an active-hours directive in a task description.
const ACTIVE_HOURS_MARKER: &str = "活跃时段";

/// Hour-of-day window. Both ends lie in `0..=24`; `end = 24` means midnight.
/// A window with `start > end` wraps past midnight (`22` to `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

impl ActiveHours {
    /// Extract the first active-hours directive from a task description.
    ///
    /// Returns `None` when no directive is present or when either hour falls
    /// outside `0..=24`.
    pub fn from_description(desc: &str) -> Option<Self> {
        let (start, end) = desc
            .match_indices(ACTIVE_HOURS_MARKER)
            .find_map(|(idx, marker)| parse_window(&desc[idx + marker.len()..]))?;
        if start > 24 || end > 24 {
            return None;
        }
        Some(Self { start, end })
    }

    /// Whether `hour` (0-23) falls inside the window.
    pub fn contains_hour(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

/// Whether firing is permitted at `now` under `hours`.
pub fn is_active(now: &NaiveDateTime, hours: &ActiveHours) -> bool {
    hours.contains_hour(now.hour())
}

/// Parse ` H:MM-H:MM` (leading whitespace required) into its two hours.
fn parse_window(text: &str) -> Option<(u32, u32)> {
    let trimmed = text.trim_start();
    if trimmed.len() == text.len() {
        return None;
    }
    let (start, rest) = parse_clock_prefix(trimmed)?;
    let rest = rest.strip_prefix('-')?;
    let (end, _) = parse_clock_prefix(rest)?;
    Some((start, end))
}

/// Consume `H:MM` or `HH:MM` from the front of `text`, returning the hour and
/// the unconsumed remainder.
fn parse_clock_prefix(text: &str) -> Option<(u32, &str)> {
    let (hour, rest) = split_digits(text, 2);
    if hour.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix(':')?;
    let (min, rest) = split_digits(rest, 2);
    if min.len() != 2 {
        return None;
    }
    Some((parse_decimal(hour)?, rest))
}

/// Split off up to `max` leading ASCII digits.
fn split_digits(text: &str, max: usize) -> (&str, &str) {
    let len = text
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    text.split_at(len)
}
