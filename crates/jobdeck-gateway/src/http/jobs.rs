//! `/api/jobs` handlers. Each one validates its input, then delegates to
//! the scheduler; none of them touches the observer registry.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveTime, Timelike};
use jobdeck_protocol::{CreateJobRequest, JobSnapshot, MessageBody};
use jobdeck_scheduler::{AtTime, JobDefinition, JobOptions, ScheduledJob, SchedulerError, Task};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::snapshot::SnapshotSource;

const JOB_NOT_FOUND: &str = "Job not found";

/// GET /api/jobs
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobSnapshot>> {
    Json(state.snapshots.snapshot().await)
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    let job = find_job(&state, parse_id(&id)?).await?;
    Ok(Json(state.snapshots.project(job.as_ref())))
}

/// POST /api/jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JobSnapshot>)> {
    let Json(req) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let definition = job_definition(&req)?;

    let options = JobOptions::named(req.name.clone()).with_tags(req.tags);
    let job = state
        .scheduler
        .new_job(definition, placeholder_task(req.name), options)
        .await?;
    info!(job_id = %job.id(), name = %job.name(), "job created");

    Ok((
        StatusCode::CREATED,
        Json(state.snapshots.project(job.as_ref())),
    ))
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = parse_id(&id)?;
    state.scheduler.remove_job(id).await.map_err(|e| match e {
        SchedulerError::JobNotFound { .. } => ApiError::NotFound(JOB_NOT_FOUND.into()),
        other => other.into(),
    })?;
    Ok(Json(MessageBody::new("Job deleted successfully")))
}

/// POST /api/jobs/{id}/run
pub async fn run_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let job = find_job(&state, parse_id(&id)?).await?;
    job.run_now()?;
    Ok(Json(MessageBody::new("Job executed")))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid job ID"))
}

async fn find_job(state: &AppState, id: Uuid) -> ApiResult<Arc<dyn ScheduledJob>> {
    state
        .scheduler
        .jobs()
        .await
        .into_iter()
        .find(|job| job.id() == id)
        .ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.into()))
}

/// Validate a creation request and translate it into a definition.
/// Checks run in a fixed order and the first failure wins.
pub fn job_definition(req: &CreateJobRequest) -> ApiResult<JobDefinition> {
    if req.name.is_empty() {
        return Err(ApiError::bad_request("Job name is required"));
    }

    match req.job_type.as_str() {
        "duration" => {
            if req.interval <= 0 {
                return Err(ApiError::bad_request(
                    "Interval must be positive for duration jobs",
                ));
            }
            Ok(JobDefinition::duration(Duration::from_secs(
                req.interval.unsigned_abs(),
            )))
        }
        "cron" => {
            if req.cron_expression.is_empty() {
                return Err(ApiError::bad_request(
                    "Cron expression is required for cron jobs",
                ));
            }
            Ok(JobDefinition::cron(req.cron_expression.clone(), false))
        }
        "daily" => {
            if req.interval <= 0 {
                return Err(ApiError::bad_request(
                    "Interval must be positive for daily jobs",
                ));
            }
            if req.at_time.is_empty() {
                return Err(ApiError::bad_request("AtTime is required for daily jobs"));
            }
            let at = parse_at_time(&req.at_time)
                .ok_or_else(|| ApiError::bad_request("Invalid time format. Use HH:MM:SS"))?;
            let interval = u32::try_from(req.interval).unwrap_or(u32::MAX);
            Ok(JobDefinition::daily(interval, vec![at]))
        }
        _ => Err(ApiError::bad_request(
            "Invalid job type. Supported: duration, cron, daily",
        )),
    }
}

/// `HH:MM:SS`, falling back to `HH:MM` with zero seconds.
fn parse_at_time(raw: &str) -> Option<AtTime> {
    let t = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;
    // chrono encodes a leap second as nanosecond >= 1e9
    if t.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(AtTime::new(t.hour(), t.minute(), t.second()))
}

/// Jobs created over the API have no real body; running one only logs.
fn placeholder_task(name: String) -> Task {
    Task::new(move || {
        let name = name.clone();
        async move {
            info!(name = %name, "executing job");
        }
    })
}
