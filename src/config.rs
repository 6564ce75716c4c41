use anyhow::Context;
use axum::http::HeaderValue;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser; `["*"]` allows any.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Length of the CPU sampling window each GET /stats blocks for.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl CollectorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

fn default_sample_interval_ms() -> u64 {
    1000
}

impl AppConfig {
    /// Load from `$CONFIG_FILE`, or `config.toml` in the working directory.
    /// A missing default file falls back to built-in defaults; an explicit `$CONFIG_FILE` must exist.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!("{} not found, using default config", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
                Err(e) => Err(anyhow::Error::new(e).context("reading config.toml")),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.cors.allowed_origins.is_empty(),
            "cors.allowed_origins must list at least one origin (use \"*\" for any)"
        );
        if self.cors.allows_any() {
            anyhow::ensure!(
                self.cors.allowed_origins.len() == 1,
                "cors.allowed_origins cannot mix \"*\" with explicit origins"
            );
        } else {
            for origin in &self.cors.allowed_origins {
                anyhow::ensure!(
                    !origin.is_empty() && HeaderValue::from_str(origin).is_ok(),
                    "cors.allowed_origins contains an invalid origin: {:?}",
                    origin
                );
            }
        }
        anyhow::ensure!(
            (1..=60_000).contains(&self.collector.sample_interval_ms),
            "collector.sample_interval_ms must be between 1 and 60000, got {}",
            self.collector.sample_interval_ms
        );
        Ok(())
    }
}
