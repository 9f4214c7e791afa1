use serde::{Deserialize, Serialize};

use crate::jobs::JobSnapshot;

/// Frame type tag of the only frame the live channel pushes.
pub const JOBS_FRAME: &str = "jobs";

/// Server → observer push carrying the full job list.
/// Wire: `{ "type": "jobs", "data": [ {...}, ... ] }`
///
/// Sent once right after the socket opens, then on every broadcast tick.
/// Each frame replaces the previous one; observers never merge frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub data: Vec<JobSnapshot>,
}

impl JobsFrame {
    pub fn new(data: Vec<JobSnapshot>) -> Self {
        Self {
            frame_type: JOBS_FRAME.to_string(),
            data,
        }
    }

    /// Serialize to the text payload written to the socket.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
