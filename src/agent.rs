//! Scheduler→agent bridge.
//!
//! Provides [`AgentExecutor`], the [`TaskExecutor`] used by the daemon: it
//! turns a fired task into a prompt, runs the local agent CLI in the task's
//! working directory, and records the run in the history table.

use crate::config::{AgentConfig, SchedulerConfig};
use crate::error::{MyccError, Result};
use crate::history::{HistoryLog, RunStatus, format_timestamp};
use crate::scheduler::{Task, TaskExecutor};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Skill cell value meaning "no skill".
const NO_SKILL: &str = "-";

/// Longest stderr excerpt carried in an agent error.
const STDERR_EXCERPT_CHARS: usize = 500;

/// Runs fired tasks through the local agent CLI.
pub struct AgentExecutor {
    config: AgentConfig,
    /// History file relative to the task's working directory; `None` disables recording.
    history_file: Option<PathBuf>,
    /// Task table location, quoted in the prompt.
    tasks_file: PathBuf,
}

impl AgentExecutor {
    /// Create an executor from agent and scheduler configuration.
    pub fn new(agent: AgentConfig, scheduler: &SchedulerConfig) -> Self {
        Self {
            config: agent,
            history_file: scheduler
                .record_history
                .then(|| scheduler.history_file.clone()),
            tasks_file: scheduler.tasks_file.clone(),
        }
    }

    fn history_log(&self, cwd: &Path) -> Option<HistoryLog> {
        self.history_file
            .as_ref()
            .map(|file| HistoryLog::new(cwd.join(file)))
    }

    /// Run the agent CLI with `prompt` as its final argument.
    async fn run_agent(&self, prompt: &str, cwd: &Path) -> Result<()> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .arg(prompt)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), command.output())
                .await
                .map_err(|_| {
                    MyccError::Agent(format!(
                        "{} timed out after {secs}s",
                        self.config.command
                    ))
                })?,
            None => command.output().await,
        }
        .map_err(|e| MyccError::Agent(format!("cannot run {}: {e}", self.config.command)))?;

        if output.status.success() {
            debug!(
                "agent produced {} bytes of output",
                output.stdout.len()
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
        Err(MyccError::Agent(format!(
            "{} exited with {}: {excerpt}",
            self.config.command, output.status
        )))
    }
}

#[async_trait]
impl TaskExecutor for AgentExecutor {
    async fn execute(&self, task: &Task, cwd: &Path) -> Result<()> {
        let started = chrono::Local::now().naive_local();
        let history = self.history_log(cwd);
        record_history(history.as_ref(), &task.name, RunStatus::Running, started).await;

        let prompt = build_prompt(task, &started, &self.tasks_file);
        let result = self.run_agent(&prompt, cwd).await;

        let status = if result.is_ok() {
            info!("scheduled task completed: {}", task.name);
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        let finished = chrono::Local::now().naive_local();
        record_history(history.as_ref(), &task.name, status, finished).await;
        result
    }
}

/// Write a history row off the async worker threads.
async fn record_history(
    log: Option<&HistoryLog>,
    task_name: &str,
    status: RunStatus,
    at: NaiveDateTime,
) {
    let Some(log) = log.cloned() else {
        return;
    };
    let task_name = task_name.to_owned();
    if let Err(e) =
        tokio::task::spawn_blocking(move || log.record(&task_name, status, &at)).await
    {
        debug!("history write task failed: {e}");
    }
}

/// Build the message sent to the agent for a fired task.
pub fn build_prompt(task: &Task, at: &NaiveDateTime, tasks_file: &Path) -> String {
    let timestamp = format_timestamp(at);
    let skill_line = if task.skill.is_empty() || task.skill == NO_SKILL {
        "1. 无需执行特定技能，直接完成任务".to_owned()
    } else {
        format!(
            "1. 执行技能：{}（位置：.claude/skills/{}）",
            task.skill,
            task.skill.replacen('/', "", 1)
        )
    };

    format!(
        "[定时任务] {name}\n\
         \n\
         时间：{timestamp}\n\
         任务：{desc}\n\
         \n\
         ---\n\
         执行要求：\n\
         {skill_line}\n\
         2. 完成后用 /tell-me 发飞书通知（位置：.claude/skills/tell-me）\n\
         3. 通知标题格式：【定时任务】{name}\n\
         4. 卡片底部 note 填写时间戳：{timestamp}\n\
         5. 任务定义位置：{tasks_file}",
        name = task.name,
        desc = task.desc,
        tasks_file = tasks_file.display(),
    )
}
