//! `jobdeck-scheduler`: the scheduling capability jobdeck observes and
//! controls, plus a Tokio-based in-process engine implementing it.
//!
//! # Overview
//!
//! The [`Scheduler`] and [`ScheduledJob`] traits are the only surface the
//! gateway depends on. [`LocalScheduler`] keeps its jobs in memory and drives
//! each one from its own task; nothing survives a restart.
//!
//! # Definition variants
//!
//! | Variant          | Behaviour                                        |
//! |------------------|--------------------------------------------------|
//! | `Duration`       | Repeat every fixed interval                      |
//! | `DurationRandom` | Repeat after a random delay within bounds        |
//! | `Cron`           | Cron expression (5 fields, or 6 with seconds)    |
//! | `Daily`          | Every N days at fixed UTC times                  |
//! | `Weekly`         | Every N weeks on chosen weekdays at UTC times    |
//! | `OneTime`        | Single fire at an absolute UTC instant           |

pub mod engine;
pub mod error;
pub mod job;
pub mod schedule;
pub mod scheduler;
pub mod types;

pub use engine::LocalScheduler;
pub use error::{Result, SchedulerError};
pub use job::ScheduledJob;
pub use scheduler::Scheduler;
pub use types::{AtTime, JobDefinition, JobOptions, Task};
