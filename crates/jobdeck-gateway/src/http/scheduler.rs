use axum::{extract::State, Json};
use jobdeck_protocol::MessageBody;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiResult;

/// POST /api/scheduler/stop
pub async fn stop_scheduler(State(state): State<Arc<AppState>>) -> ApiResult<Json<MessageBody>> {
    state.scheduler.stop_jobs().await?;
    Ok(Json(MessageBody::new("Scheduler stopped")))
}

/// POST /api/scheduler/start
pub async fn start_scheduler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MessageBody>> {
    state.scheduler.start().await?;
    Ok(Json(MessageBody::new("Scheduler started")))
}
