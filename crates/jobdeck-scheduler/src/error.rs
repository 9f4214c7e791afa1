use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
///
/// The `Display` text is what API clients see: the gateway forwards it
/// verbatim in 500 responses.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The provided schedule definition or job option is invalid or unsupported.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// No job with the given ID exists.
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    /// Firing was requested while the scheduler is stopped.
    #[error("Scheduler is not running")]
    NotRunning,

    /// The scheduler has been shut down and accepts no further work.
    #[error("Scheduler has been shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
