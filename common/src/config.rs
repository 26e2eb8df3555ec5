// Configuration management with layered configuration (defaults, file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main settings structure shared by both consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub poller: PollerConfig,
    pub nats: NatsConfig,
    pub tail: TailConfig,
    pub observability: ObservabilityConfig,
}

/// S3-compatible object storage (AWS, MinIO, LocalStack)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Endpoint including scheme, e.g. "http://localhost:4566"
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Only keys starting with this prefix are listed. Empty means the whole bucket.
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_path_style() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    pub poll_interval_seconds: u64,
    #[serde(default)]
    pub startup_delay_seconds: u64,
}

impl PollerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    pub stream_name: String,
    /// Subject the tail subscribes to (the "topic")
    pub subject: String,
    pub consumer_name: String,
    /// Replay everything retained in the stream instead of only new messages
    #[serde(default)]
    pub deliver_all: bool,
    pub max_age_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailConfig {
    /// Number of payload bytes shown per message
    pub preview_bytes: usize,
    #[serde(default)]
    pub startup_delay_seconds: u64,
}

impl TailConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_port: Option<u16>,
    pub tracing_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        Self::load_layered(config_dir.as_ref(), Self::environment(None))
    }

    /// `APP__SECTION__KEY` variables, read from the process or from `vars`.
    ///
    /// Values stay strings here; numeric and boolean fields are converted
    /// during deserialization so string fields keep values like "007".
    fn environment(vars: Option<config::Map<String, String>>) -> Environment {
        Environment::with_prefix("APP").separator("__").source(vars)
    }

    fn load_layered(config_dir: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&Settings::default())?;

        let builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(environment);

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.validate_poller()?;
        self.validate_tail()
    }

    /// Validate the sections the bucket poller reads
    pub fn validate_poller(&self) -> Result<(), String> {
        if self.storage.endpoint.is_empty() {
            return Err("Storage endpoint cannot be empty".to_string());
        }
        if self.storage.bucket.is_empty() {
            return Err("Storage bucket cannot be empty".to_string());
        }

        if self.poller.poll_interval_seconds == 0 {
            return Err("Poller poll_interval_seconds must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Validate the sections the topic tail reads
    pub fn validate_tail(&self) -> Result<(), String> {
        if self.nats.url.is_empty() {
            return Err("NATS URL cannot be empty".to_string());
        }
        if self.nats.stream_name.is_empty() {
            return Err("NATS stream_name cannot be empty".to_string());
        }
        if self.nats.subject.is_empty() {
            return Err("NATS subject cannot be empty".to_string());
        }
        if self.nats.consumer_name.is_empty() {
            return Err("NATS consumer_name cannot be empty".to_string());
        }

        if self.tail.preview_bytes == 0 {
            return Err("Tail preview_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                endpoint: "http://localhost:4566".to_string(),
                region: "us-east-1".to_string(),
                access_key: "test".to_string(),
                secret_key: "test".to_string(),
                bucket: "landing".to_string(),
                prefix: String::new(),
                path_style: true,
            },
            poller: PollerConfig {
                poll_interval_seconds: 30,
                startup_delay_seconds: 0,
            },
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                stream_name: "LANDING".to_string(),
                subject: "landing.>".to_string(),
                consumer_name: "topic-tail".to_string(),
                deliver_all: false,
                max_age_seconds: 86400, // 24 hours
            },
            tail: TailConfig {
                preview_bytes: 100,
                startup_delay_seconds: 0,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Json,
                metrics_port: None,
                tracing_endpoint: None,
            },
        }
    }
}
