//! Shared configuration, error type and identifiers for the jobdeck workspace.

pub mod config;
pub mod error;
pub mod types;

pub use config::JobdeckConfig;
pub use error::{JobdeckError, Result};
