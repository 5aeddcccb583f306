//! # Relay Configuration
//!
//! Runtime configuration for the relay, loaded from environment variables.
//!
//! ## Security Requirements
//!
//! - `RELAY_SHARED_SECRET` MUST be present and at least 16 bytes
//! - An all-zero secret is refused
//! - Secrets never appear in `Debug` output

use std::path::PathBuf;
use std::str::FromStr;

use relay_pipeline::{
    RelayPolicy, DEFAULT_LATENCY_CEILING_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WINDOW_SIZE,
};
use shared_crypto::{CryptoError, KeyMaterial};
use thiserror::Error;

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Key material for both legs.
    pub security: SecurityConfig,
    /// Replay window sizing.
    pub window: WindowConfig,
    /// End-to-end latency budget.
    pub latency: LatencyConfig,
    /// Detection event storage.
    pub sink: SinkConfig,
    /// Seconds between stats lines. Zero disables the reporter.
    pub stats_interval_secs: u64,
    /// Messages each ingress handler may have in the pipeline at once.
    pub max_in_flight: usize,
}

/// Default per-direction in-flight message limit.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

impl RelayConfig {
    /// Configuration with defaults around a provisioned secret.
    pub fn new(shared_secret: KeyMaterial) -> Self {
        Self {
            security: SecurityConfig {
                shared_secret,
                cloud_secret: None,
            },
            window: WindowConfig::default(),
            latency: LatencyConfig::default(),
            sink: SinkConfig::default(),
            stats_interval_secs: 30,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `RELAY_SHARED_SECRET`: hex secret (required)
    /// - `RELAY_CLOUD_SECRET`: hex secret for the cloud leg (optional)
    /// - `RELAY_WINDOW_SIZE`: replay window capacity (default: 100)
    /// - `RELAY_MAX_DELAY_MS`: replay horizon (default: 5000)
    /// - `RELAY_LATENCY_CEILING_MS`: maximum message age (default: 5000)
    /// - `RELAY_EVENT_SINK`: `memory` or `jsonl` (default: memory)
    /// - `RELAY_EVENT_LOG`: path for the `jsonl` sink
    /// - `RELAY_SINK_QUEUE`: event queue capacity (default: 1024)
    /// - `RELAY_STATS_INTERVAL_SECS`: stats period (default: 30)
    /// - `RELAY_MAX_IN_FLIGHT`: concurrent messages per direction (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let shared_hex = lookup("RELAY_SHARED_SECRET").ok_or(ConfigError::MissingSecret)?;
        let shared_secret = decode_secret("RELAY_SHARED_SECRET", &shared_hex)?;
        let cloud_secret = lookup("RELAY_CLOUD_SECRET")
            .filter(|v| !v.trim().is_empty())
            .map(|v| decode_secret("RELAY_CLOUD_SECRET", &v))
            .transpose()?;

        let mut config = Self::new(shared_secret);
        config.security.cloud_secret = cloud_secret;

        config.window.window_size = parse_var(&lookup, "RELAY_WINDOW_SIZE", DEFAULT_WINDOW_SIZE)?;
        config.window.max_delay_ms =
            parse_var(&lookup, "RELAY_MAX_DELAY_MS", DEFAULT_MAX_DELAY_MS)?;
        config.latency.ceiling_ms =
            parse_var(&lookup, "RELAY_LATENCY_CEILING_MS", DEFAULT_LATENCY_CEILING_MS)?;
        config.sink.queue_capacity =
            parse_var(&lookup, "RELAY_SINK_QUEUE", DEFAULT_QUEUE_CAPACITY)?;
        config.stats_interval_secs =
            parse_var(&lookup, "RELAY_STATS_INTERVAL_SECS", config.stats_interval_secs)?;
        config.max_in_flight =
            parse_var(&lookup, "RELAY_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?;

        if let Some(kind) = lookup("RELAY_EVENT_SINK") {
            config.sink.kind = kind.parse()?;
        }
        if let Some(path) = lookup("RELAY_EVENT_LOG") {
            config.sink.path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.shared_secret.is_all_zero() {
            return Err(ConfigError::InsecureSecret("RELAY_SHARED_SECRET"));
        }
        if let Some(cloud) = &self.security.cloud_secret {
            if cloud.is_all_zero() {
                return Err(ConfigError::InsecureSecret("RELAY_CLOUD_SECRET"));
            }
        }
        if self.window.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.sink.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueue);
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::ZeroInFlight);
        }
        Ok(())
    }

    /// Pipeline policy derived from this configuration.
    pub fn policy(&self) -> RelayPolicy {
        RelayPolicy {
            window_size: self.window.window_size,
            max_delay_ms: self.window.max_delay_ms,
            latency_ceiling_ms: self.latency.ceiling_ms,
        }
    }
}

fn decode_secret(var: &'static str, value: &str) -> Result<KeyMaterial, ConfigError> {
    KeyMaterial::from_hex(value).map_err(|source| ConfigError::InvalidSecret { var, source })
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RELAY_SHARED_SECRET is not set")]
    MissingSecret,

    #[error("{var} is not usable: {source}")]
    InvalidSecret {
        var: &'static str,
        source: CryptoError,
    },

    #[error("SECURITY VIOLATION: {0} is all zeros")]
    InsecureSecret(&'static str),

    #[error("{var} has invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("unknown event sink {0:?}, expected memory or jsonl")]
    UnknownSink(String),

    #[error("replay window size must be at least 1")]
    ZeroWindow,

    #[error("event queue capacity must be at least 1")]
    ZeroQueue,

    #[error("in-flight limit must be at least 1")]
    ZeroInFlight,
}

/// Key material.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret for the device leg, and for both legs when `cloud_secret` is unset.
    pub shared_secret: KeyMaterial,
    /// Separate secret for the cloud leg.
    pub cloud_secret: Option<KeyMaterial>,
}

/// Replay window configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub window_size: usize,
    pub max_delay_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Latency gate configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyConfig {
    pub ceiling_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            ceiling_ms: DEFAULT_LATENCY_CEILING_MS,
        }
    }
}

/// Where detection events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Kept in process memory.
    #[default]
    Memory,
    /// Appended to a JSON-lines file.
    JsonLines,
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "jsonl" | "json-lines" | "file" => Ok(Self::JsonLines),
            other => Err(ConfigError::UnknownSink(other.to_string())),
        }
    }
}

/// Event sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// File path for [`SinkKind::JsonLines`].
    pub path: PathBuf,
    /// Capacity of the dispatch queue in front of the sink.
    pub queue_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Memory,
            path: PathBuf::from("./relay-events.jsonl"),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
