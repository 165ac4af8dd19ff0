//! Configuration management
//!
//! Handles loading and validating bridge configuration from TOML files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Editor endpoint and transport tuning
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// Host the editor bridge listens on
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port of the editor bridge
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline for opening the TCP connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Deadline for each individual read while awaiting a reply
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Maximum bytes requested per read
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl EditorConfig {
    /// `host:port` form used in logs and errors
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint
    #[serde(default)]
    pub enabled: bool,
    /// Metrics server bind address
    #[serde(default = "default_metrics_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: default_metrics_addr(),
        }
    }
}

// Default value functions
fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 6400 }
fn default_connect_timeout() -> u64 { 5_000 }
fn default_read_timeout() -> u64 { 60_000 }
fn default_buffer_size() -> usize { 16 * 1024 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }
fn default_metrics_addr() -> SocketAddr { SocketAddr::from(([127, 0, 0, 1], 9464)) }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.editor.host.trim().is_empty() {
            anyhow::bail!("editor.host must not be empty");
        }
        if self.editor.port == 0 {
            anyhow::bail!("editor.port must be > 0");
        }
        if self.editor.connect_timeout_ms == 0 {
            anyhow::bail!("editor.connect_timeout_ms must be > 0");
        }
        if self.editor.read_timeout_ms == 0 {
            anyhow::bail!("editor.read_timeout_ms must be > 0");
        }
        if self.editor.buffer_size == 0 {
            anyhow::bail!("editor.buffer_size must be > 0");
        }
        Ok(())
    }
}
