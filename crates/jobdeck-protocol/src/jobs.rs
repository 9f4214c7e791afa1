use serde::{Deserialize, Serialize};

/// Point-in-time projection of one scheduler job.
/// Wire: `{ "id": "...", "name": "...", "tags": [...], "nextRun": "...", ... }`
///
/// Rebuilt on every query and never stored. `schedule` and `scheduleDetail`
/// are display labels inferred by the gateway, not the job's real definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    /// RFC 3339 or `""` when no run is planned.
    pub next_run: String,
    /// RFC 3339 or `""` when the job never ran.
    pub last_run: String,
    /// Upcoming runs, soonest first.
    pub next_runs: Vec<String>,
    pub schedule: String,
    pub schedule_detail: String,
}

/// Body of `POST /api/jobs`.
/// Wire: `{ "name": "report", "type": "daily", "interval": 1, "atTime": "14:30" }`
///
/// Every field is optional at the decoding layer so that a missing name or
/// interval surfaces as a validation message rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub name: String,
    /// `duration`, `cron` or `daily`.
    #[serde(rename = "type", default)]
    pub job_type: String,
    /// Seconds for `duration`, days for `daily`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub interval: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cron_expression: String,
    /// `HH:MM:SS` or `HH:MM`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub at_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Success body of control operations that return no snapshot.
/// Wire: `{ "message": "Job executed" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Uniform failure body for every 4xx/5xx response.
/// Wire: `{ "error": "Job not found" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
