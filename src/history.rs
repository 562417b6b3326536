//! Firing history log.
//!
//! Appends one Markdown table row per state change of a fired task to
//! `history.md`, next to the task table. Recording is best effort: a
//! history write must never affect task execution.

use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

const HISTORY_HEADER: &str = "# 定时任务执行记录

> 每次执行任务都会记录在这里

---

| 时间 | 任务 | 状态 |
|------|------|------|
";

/// Serialises history writes within the process. Executions run on
/// separate tasks and several may finish in the same instant.
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Execution state written to the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// Label shown in the status column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "执行中...",
            Self::Succeeded => "✅ 成功",
            Self::Failed => "❌ 失败",
        }
    }
}

/// Append-only writer for `history.md`.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Create a log writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `| {at} | {task_name} | {status} |`, creating the file with a
    /// header first if needed. Failures are logged at debug level and dropped.
    pub fn record(&self, task_name: &str, status: RunStatus, at: &NaiveDateTime) {
        if let Err(e) = self.try_record(task_name, status, at) {
            debug!(
                "cannot record history in {}: {e}",
                self.path.display()
            );
        }
    }

    fn try_record(
        &self,
        task_name: &str,
        status: RunStatus,
        at: &NaiveDateTime,
    ) -> std::io::Result<()> {
        let _guard = WRITE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut row = String::new();
        if file.metadata()?.len() == 0 {
            row.push_str(HISTORY_HEADER);
        }
        row.push_str(&format!(
            "| {} | {task_name} | {} |\n",
            format_timestamp(at),
            status.label()
        ));
        file.write_all(row.as_bytes())
    }
}

/// `YYYY-MM-DD HH:MM`, the timestamp format used in history rows and prompts.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
