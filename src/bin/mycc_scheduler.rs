//! Scheduler daemon binary for mycc.
//!
//! Watches `.claude/skills/scheduler/tasks.md` under the working directory
//! and relays each due task to the local agent CLI until interrupted.

use clap::{Parser, Subcommand};
use mycc::agent::AgentExecutor;
use mycc::scheduler::{is_eligible, parse_tasks};
use mycc::{MyccConfig, Scheduler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// mycc scheduler: run a local agent on a hand-edited task table.
#[derive(Parser)]
#[command(name = "mycc-scheduler", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project directory containing `.claude/skills/scheduler/tasks.md`.
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the scheduler until Ctrl-C.
    Run,

    /// Parse the task table and show which tasks are due right now.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(MyccConfig::default_config_path);
    let config = MyccConfig::load_or_default(&config_path)?;
    let _log_guard = init_logging(&config)?;

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, cwd).await,
        Command::Check => check(&config, &cwd),
    }
}

/// Install the stderr subscriber, plus a daily rolling file when enabled.
fn init_logging(
    config: &MyccConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.logging.file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let logs_dir = mycc::mycc_dirs::logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    let appender = tracing_appender::rolling::daily(logs_dir, "mycc-scheduler.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(Some(guard))
}

async fn run(config: MyccConfig, cwd: PathBuf) -> anyhow::Result<()> {
    if !config.scheduler.enabled {
        info!("scheduler disabled in config, exiting");
        return Ok(());
    }

    let executor = Arc::new(AgentExecutor::new(config.agent.clone(), &config.scheduler));
    let mut scheduler = Scheduler::new(&config.scheduler);
    scheduler.start(cwd, executor);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    scheduler.stop();
    Ok(())
}

fn check(config: &MyccConfig, cwd: &std::path::Path) -> anyhow::Result<()> {
    let tasks_path = cwd.join(&config.scheduler.tasks_file);
    let content = match std::fs::read_to_string(&tasks_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("no task table at {}", tasks_path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let tasks = parse_tasks(Some(&content));
    let now = chrono::Local::now().naive_local();

    println!("{} task(s) in {}", tasks.len(), tasks_path.display());
    for task in &tasks {
        let marker = if is_eligible(task, &now) { "*" } else { " " };
        let window = task
            .active_hours
            .map(|h| format!(" [active {:02}-{:02}]", h.start, h.end))
            .unwrap_or_default();
        println!(
            "{marker} {:<12} {:<28} skill={}{window}",
            task.name,
            task.schedule.to_string(),
            task.skill
        );
    }
    Ok(())
}
