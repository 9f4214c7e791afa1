use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_TITLE: &str = "GoCron Scheduler";
pub const BROADCAST_INTERVAL_MS: u64 = 1_000; // one push per second to every observer
pub const OBSERVER_QUEUE_DEPTH: usize = 16; // frames buffered per observer before it counts as failed
pub const NEXT_RUNS_COUNT: usize = 5; // upcoming runs listed per job snapshot

/// Top-level config (jobdeck.toml + JOBDECK_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobdeckConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Title reported to the UI via `GET /api/config`.
    #[serde(default = "default_title")]
    pub title: String,
    /// Attach a permissive CORS layer (any origin, method and header).
    #[serde(default = "bool_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            title: default_title(),
            cors: true,
        }
    }
}

/// Live-view push settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Outbound frames buffered per observer. A push into a full queue
    /// counts as a failed send and drops the observer.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_next_runs")]
    pub next_runs: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            queue_depth: default_queue_depth(),
            next_runs: default_next_runs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Seed the sample job set on startup.
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_interval_ms() -> u64 {
    BROADCAST_INTERVAL_MS
}
fn default_queue_depth() -> usize {
    OBSERVER_QUEUE_DEPTH
}
fn default_next_runs() -> usize {
    NEXT_RUNS_COUNT
}

impl JobdeckConfig {
    /// Load config from a TOML file with JOBDECK_* env var overrides.
    ///
    /// The file is `config_path` when given, else `~/.jobdeck/jobdeck.toml`.
    /// A missing file is not an error; defaults fill every absent key.
    /// Nested keys use a double underscore: `JOBDECK_SERVER__PORT=9000`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        tracing::debug!(path = %path, "loading config");
        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::JobdeckError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(JobdeckConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("JOBDECK_").split("__"))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobdeck/jobdeck.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_constants() {
        let config = JobdeckConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.title, DEFAULT_TITLE);
        assert!(config.server.cors);
        assert_eq!(config.broadcast.interval_ms, 1_000);
        assert_eq!(config.broadcast.next_runs, 5);
        assert!(config.demo.enabled);
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config =
                JobdeckConfig::load(Some("does-not-exist.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, DEFAULT_PORT);
            assert_eq!(config.broadcast.queue_depth, OBSERVER_QUEUE_DEPTH);
            Ok(())
        });
    }

    #[test]
    fn file_and_env_are_merged() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "jobdeck.toml",
                r#"
                [server]
                port = 9090
                title = "Ops jobs"

                [demo]
                enabled = false
                "#,
            )?;
            jail.set_env("JOBDECK_BROADCAST__INTERVAL_MS", "250");
            jail.set_env("JOBDECK_SERVER__PORT", "9191");

            let config =
                JobdeckConfig::load(Some("jobdeck.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9191);
            assert_eq!(config.server.title, "Ops jobs");
            assert_eq!(config.server.bind, DEFAULT_BIND);
            assert_eq!(config.broadcast.interval_ms, 250);
            assert!(!config.demo.enabled);
            Ok(())
        });
    }
}
