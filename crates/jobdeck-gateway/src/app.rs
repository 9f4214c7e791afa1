use axum::{
    routing::{get, post},
    Router,
};
use jobdeck_core::config::JobdeckConfig;
use jobdeck_scheduler::Scheduler;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::snapshot::SnapshotBuilder;
use crate::ws::registry::ConnectionRegistry;

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: JobdeckConfig,
    pub scheduler: Arc<dyn Scheduler>,
    pub snapshots: SnapshotBuilder,
    /// Live-view observers: conn_id -> outbound queue.
    pub observers: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(config: JobdeckConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let snapshots = SnapshotBuilder::new(Arc::clone(&scheduler), config.broadcast.next_runs);
        Self {
            config,
            scheduler,
            snapshots,
            observers: Arc::new(ConnectionRegistry::new()),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    use crate::http::{config, health, jobs, scheduler};

    let cors = state.config.server.cors;
    let router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route("/api/config", get(config::ui_config))
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/{id}", get(jobs::get_job).delete(jobs::delete_job))
        .route("/api/jobs/{id}/run", post(jobs::run_job))
        .route("/api/scheduler/stop", post(scheduler::stop_scheduler))
        .route("/api/scheduler/start", post(scheduler::start_scheduler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
