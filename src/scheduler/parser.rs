//! `tasks.md` table parser.
//!
//! Expected layout:
//!
//! ```text
//! | 时间 | 任务 | Skill | 说明 |
//! |------|------|-------|------|
//! | 09:00 | 晨报 | news | 每日简报 |
//! | 每30分钟 | 心跳 | - | 检查，活跃时段 09:00-24:00 |
//! ```
//!
//! Parsing is best effort: rows that are too short or whose time cell is
//! not a recognised schedule are dropped without error.

use crate::scheduler::active_hours::ActiveHours;
use crate::scheduler::tasks::{Schedule, Task};
use tracing::trace;

/// Substrings that mark header or separator rows.
const HEADER_MARKERS: [&str; 3] = ["时间", "日期时间", "---"];

/// Parse the task table in `content` into tasks, in file order.
pub fn parse_tasks(content: Option<&str>) -> Vec<Task> {
    let Some(content) = content else {
        return Vec::new();
    };

    content.lines().filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<Task> {
    if !line.starts_with('|') {
        return None;
    }
    if HEADER_MARKERS.iter().any(|marker| line.contains(marker)) {
        return None;
    }

    let cells: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    // time, name, skill, description; further cells are ignored
    let [time, name, skill, desc, ..] = cells[..] else {
        trace!("skipping short task row: {line}");
        return None;
    };

    let Some(schedule) = Schedule::parse(time) else {
        trace!("skipping task row with unrecognised time {time:?}");
        return None;
    };

    Some(Task {
        time: time.to_owned(),
        name: name.to_owned(),
        skill: skill.to_owned(),
        desc: desc.to_owned(),
        schedule,
        active_hours: ActiveHours::from_description(desc),
    })
}
