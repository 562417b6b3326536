//! mycc: personal automation daemon around a local coding agent.
//!
//! The crate's core is the task scheduler: it reads a hand-edited Markdown
//! table of tasks, decides once per tick which tasks are due, and hands each
//! due occurrence to an execution callback exactly once.
//!
//! # Architecture
//!
//! - **Parser**: turns `tasks.md` rows into typed [`Task`](scheduler::Task) values
//! - **Matcher**: decides whether a time spec is due at a given wall-clock instant
//! - **Active hours**: optional per-task hour window, possibly wrapping midnight
//! - **Occurrence lock**: at-most-once firing per task occurrence
//! - **Runner**: the periodic loop tying the above to a [`TaskExecutor`](scheduler::TaskExecutor)
//!
//! The [`agent`] and [`history`] modules provide the host-side executor that
//! relays a fired task to the local agent CLI and records the outcome.

pub mod agent;
pub mod config;
pub mod error;
pub mod history;
pub mod mycc_dirs;
pub mod scheduler;

pub use config::MyccConfig;
pub use error::{MyccError, Result};
pub use scheduler::{Scheduler, Task, TaskExecutor};
