//! Scheduler background loop.
//!
//! Spawns a tokio task that re-reads the task table every tick and hands
//! each due occurrence to a [`TaskExecutor`]. Executions run on their own
//! tokio tasks, so a slow agent never delays the next tick.

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::scheduler::active_hours::is_active;
use crate::scheduler::lock::OccurrenceLock;
use crate::scheduler::parser::parse_tasks;
use crate::scheduler::tasks::Task;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Callback that carries out a fired task.
///
/// Errors are logged per task and never stop the scheduler. A failed
/// execution is not retried within the same occurrence.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Execute `task` with `cwd` as the working directory.
    async fn execute(&self, task: &Task, cwd: &Path) -> Result<()>;
}

/// Keep the tasks that are due at `now`, inside their active hours, and
/// whose occurrence has not fired yet. Checks run in that order and the
/// lock is only consulted for tasks that pass the first two.
pub fn select_due(tasks: Vec<Task>, now: &NaiveDateTime, lock: &OccurrenceLock) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| is_eligible(task, now) && task_lock_acquired(task, now, lock))
        .collect()
}

/// Whether `task` is due at `now` and inside its active hours. Ignores
/// whether the occurrence has already fired.
pub fn is_eligible(task: &Task, now: &NaiveDateTime) -> bool {
    if !task.schedule.is_due(now) {
        return false;
    }
    if task
        .active_hours
        .is_some_and(|hours| !is_active(now, &hours))
    {
        debug!("task {} is due but outside its active hours", task.name);
        return false;
    }
    true
}

fn task_lock_acquired(task: &Task, now: &NaiveDateTime, lock: &OccurrenceLock) -> bool {
    let acquired = lock.try_acquire(&task.name, &task.time, now);
    if !acquired {
        debug!("task {} already fired for this occurrence", task.name);
    }
    acquired
}

/// One evaluation pass over the task table.
///
/// Owns the occurrence lock for a single scheduler run.
pub struct Ticker {
    cwd: PathBuf,
    tasks_path: PathBuf,
    executor: Arc<dyn TaskExecutor>,
    lock: OccurrenceLock,
}

impl Ticker {
    /// Create a ticker reading `tasks_path` and executing in `cwd`, with an empty lock.
    pub fn new(cwd: PathBuf, tasks_path: PathBuf, executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            cwd,
            tasks_path,
            executor,
            lock: OccurrenceLock::new(),
        }
    }

    /// Occurrences fired so far.
    pub fn lock(&self) -> &OccurrenceLock {
        &self.lock
    }

    /// Evaluate the task table at `now`, dispatch every newly due task, and
    /// return the dispatched tasks.
    ///
    /// A missing task file means no tasks are configured. Any other read
    /// failure is logged and ends the pass early. Must be called within a
    /// tokio runtime.
    pub async fn tick_at(&self, now: NaiveDateTime) -> Vec<Task> {
        let content = match tokio::fs::read_to_string(&self.tasks_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    "cannot read task file {}: {e}",
                    self.tasks_path.display()
                );
                return Vec::new();
            }
        };

        let due = select_due(parse_tasks(Some(&content)), &now, &self.lock);
        for task in &due {
            info!("executing scheduled task: {} ({})", task.name, task.schedule);
            self.dispatch(task.clone());
        }
        due
    }

    fn dispatch(&self, task: Task) {
        let executor = Arc::clone(&self.executor);
        let cwd = self.cwd.clone();
        let name = task.name.clone();
        let run = tokio::spawn(async move { executor.execute(&task, &cwd).await });
        tokio::spawn(async move {
            match run.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("scheduled task {name} failed: {e}"),
                Err(e) => error!("scheduled task {name} panicked: {e}"),
            }
        });
    }
}

struct RunningLoop {
    cancel: CancellationToken,
    ticker: Arc<Ticker>,
}

/// Periodic task scheduler with an explicit start/stop lifecycle.
///
/// Each [`start`](Self::start) begins with an empty occurrence lock;
/// [`stop`](Self::stop) discards it. Independent schedulers share nothing.
pub struct Scheduler {
    tick_interval: Duration,
    tasks_file: PathBuf,
    running: Option<RunningLoop>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl Scheduler {
    /// Create a stopped scheduler from configuration.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(config.tick_interval_secs.max(1)),
            tasks_file: config.tasks_file.clone(),
            running: None,
        }
    }

    /// Override the tick period.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Number of occurrences fired since the current run started.
    pub fn fired_count(&self) -> usize {
        self.running
            .as_ref()
            .map_or(0, |running| running.ticker.lock().len())
    }

    /// Start ticking. The first tick runs immediately, then once per period.
    ///
    /// Does nothing if already running. Must be called within a tokio runtime.
    pub fn start(&mut self, cwd: impl Into<PathBuf>, executor: Arc<dyn TaskExecutor>) {
        if self.running.is_some() {
            info!("scheduler already running");
            return;
        }

        let cwd = cwd.into();
        let tasks_path = cwd.join(&self.tasks_file);
        let ticker = Arc::new(Ticker::new(cwd, tasks_path, executor));
        let cancel = CancellationToken::new();

        tokio::spawn(run_loop(
            Arc::clone(&ticker),
            self.tick_interval,
            cancel.clone(),
        ));

        info!(
            "scheduler started, watching {}",
            ticker.tasks_path.display()
        );
        self.running = Some(RunningLoop { cancel, ticker });
    }

    /// Stop ticking and discard the occurrence lock. Executions already in
    /// flight are left to finish. Does nothing if not running.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            info!("scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

async fn run_loop(ticker: Arc<Ticker>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("scheduler loop cancelled");
                break;
            }
            _ = interval.tick() => {
                let now = chrono::Local::now().naive_local();
                ticker.tick_at(now).await;
            }
        }
    }
}
