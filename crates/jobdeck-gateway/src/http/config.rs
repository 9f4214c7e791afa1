use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

/// UI settings exposed to the dashboard.
#[derive(Debug, Serialize)]
pub struct UiConfig {
    pub title: String,
}

/// GET /api/config
pub async fn ui_config(State(state): State<Arc<AppState>>) -> Json<UiConfig> {
    Json(UiConfig {
        title: state.config.server.title.clone(),
    })
}
