use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use jobdeck_core::config::JobdeckConfig;
use jobdeck_scheduler::{LocalScheduler, Scheduler};

mod app;
mod demo;
mod describe;
mod error;
mod http;
mod shutdown;
mod snapshot;
mod ws;

/// Web dashboard and control API for an in-process job scheduler.
#[derive(Parser, Debug)]
#[command(name = "jobdeck-gateway")]
#[command(version)]
struct Args {
    /// Path to the TOML config file (default: $JOBDECK_CONFIG or ~/.jobdeck/jobdeck.toml)
    #[arg(long)]
    config: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Custom title for the UI
    #[arg(long)]
    title: Option<String>,

    /// Start with an empty scheduler instead of the demo job set
    #[arg(long)]
    no_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jobdeck_gateway=info,jobdeck_scheduler=info,tower_http=debug".into()
            }),
        )
        .init();

    let args = Args::parse();

    // load config: --config > JOBDECK_CONFIG env > ~/.jobdeck/jobdeck.toml
    let config_path = args.config.clone().or_else(|| std::env::var("JOBDECK_CONFIG").ok());
    let mut config = JobdeckConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        JobdeckConfig::default()
    });
    apply_overrides(&mut config, &args);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let period = Duration::from_millis(config.broadcast.interval_ms.max(1));

    let scheduler = Arc::new(LocalScheduler::new());
    if config.demo.enabled {
        demo::seed(scheduler.as_ref()).await;
    }
    scheduler.start().await?;
    info!(jobs = scheduler.jobs().await.len(), "scheduler started");

    let state = Arc::new(app::AppState::new(config, scheduler.clone()));
    let router = app::build_router(Arc::clone(&state));

    let shutdown = shutdown::install_shutdown_handler();

    let broadcast = ws::broadcast::BroadcastLoop::new(
        state.snapshots.clone(),
        Arc::clone(&state.observers),
    );
    let broadcast_task = tokio::spawn(broadcast.run(period, shutdown.clone()));

    info!(title = %state.config.server.title, "jobdeck gateway listening on {}", addr);
    info!("web UI:    http://{}", addr);
    info!("API:       http://{}/api", addr);
    info!("WebSocket: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    // the server may also stop on its own; make sure the broadcast loop follows
    shutdown.cancel();
    let _ = broadcast_task.await;
    scheduler.shutdown();
    info!("server stopped gracefully");
    Ok(())
}

/// Command-line flags win over file and env values.
fn apply_overrides(config: &mut JobdeckConfig, args: &Args) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(title) = &args.title {
        config.server.title = title.clone();
    }
    if args.no_demo {
        config.demo.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "jobdeck-gateway",
            "--port",
            "9090",
            "--title",
            "Ops",
            "--no-demo",
        ]);
        let mut config = JobdeckConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.title, "Ops");
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(!config.demo.enabled);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::parse_from(["jobdeck-gateway"]);
        let mut config = JobdeckConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.server.port, 8080);
        assert!(config.demo.enabled);
    }
}
