//! Task scheduler.
//!
//! Re-reads the task table every tick and fires each due occurrence once.
//! Lock state is in-memory only and starts empty on every [`Scheduler::start`].

pub mod active_hours;
pub mod lock;
pub mod matcher;
pub mod parser;
pub mod runner;
pub mod tasks;

pub use active_hours::{ActiveHours, is_active};
pub use lock::{OccurrenceLock, occurrence_key};
pub use matcher::{TOLERANCE_MINUTES, is_due};
pub use parser::parse_tasks;
pub use runner::{Scheduler, TaskExecutor, Ticker, is_eligible, select_due};
pub use tasks::{IntervalUnit, Schedule, Task, TaskType};
