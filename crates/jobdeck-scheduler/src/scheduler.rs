use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    job::ScheduledJob,
    types::{JobDefinition, JobOptions, Task},
};

/// Capability interface a scheduling engine exposes to the rest of jobdeck.
///
/// Implementations synchronize their own job table; callers assume nothing
/// about atomicity across two calls (listing then acting on a job may race
/// with its removal).
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Current jobs in the engine's enumeration order.
    async fn jobs(&self) -> Vec<Arc<dyn ScheduledJob>>;

    /// Register a job. Fails with `InvalidSchedule` when the definition or
    /// options are rejected.
    async fn new_job(
        &self,
        definition: JobDefinition,
        task: Task,
        options: JobOptions,
    ) -> Result<Arc<dyn ScheduledJob>>;

    /// Remove a job. Fails with `JobNotFound` when no such job exists.
    async fn remove_job(&self, id: Uuid) -> Result<()>;

    /// Begin (or resume) firing jobs on their schedules.
    async fn start(&self) -> Result<()>;

    /// Halt all scheduled firing. Jobs stay registered.
    async fn stop_jobs(&self) -> Result<()>;
}
