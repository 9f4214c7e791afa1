//! Wire types shared by the REST API and the live `/ws` channel.

pub mod frames;
pub mod jobs;
pub mod time;

pub use frames::JobsFrame;
pub use jobs::{CreateJobRequest, ErrorBody, JobSnapshot, MessageBody};
