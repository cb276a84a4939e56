//! Server configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use wellness_stream::ProcessorConfig;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Worker pool and queue sizing
    #[serde(default)]
    pub processor: ProcessorConfig,

    /// Allow cross-origin requests from any origin
    #[serde(default)]
    pub cors: bool,

    /// Seconds between SSE keep-alive comments on idle streams
    #[serde(default = "default_keep_alive_secs")]
    pub sse_keep_alive_secs: u64,
}

/// Values supplied on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
    pub capacity: Option<usize>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("failed to read {config_path}"))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse {config_path}"))?
        } else {
            debug!(path = config_path, "config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(listen) = &overrides.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            config.port = port;
        }

        if let Some(workers) = overrides.workers {
            config.processor.workers = workers;
        }

        if let Some(capacity) = overrides.capacity {
            config.processor = config.processor.with_capacity(capacity);
        }

        config.processor = config.processor.normalized();
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.listen, self.port))
    }

    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            processor: ProcessorConfig::default(),
            cors: false,
            sse_keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_keep_alive_secs() -> u64 {
    15
}
