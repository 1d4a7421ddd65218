use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    /// Session token configuration
    pub auth: AuthConfig,
    /// Simulated network behaviour
    pub network: NetworkConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: file or memory
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Directory holding one JSON file per record (file backend)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Seed missing collections with the bundled demo catalog
    #[serde(default = "default_seed")]
    pub seed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared by access and refresh tokens. When empty, an
    /// ephemeral secret is generated at startup and sessions do not survive
    /// a restart.
    #[serde(default)]
    pub jwt_secret: String,

    /// Access token expiration in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds (default: 604800 = 7 days)
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Base latency of a simulated call; cheaper operations wait a fraction of it
    #[serde(default = "default_base_latency_ms")]
    pub base_latency_ms: u64,

    /// Upper bound on a whole call, latency included
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_jobs_enabled")]
    pub enabled: bool,

    #[serde(default = "default_reminder_interval_minutes")]
    pub reminder_interval_minutes: u64,

    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: default_jobs_enabled(),
            reminder_interval_minutes: default_reminder_interval_minutes(),
            metrics_interval_secs: default_metrics_interval_secs(),
        }
    }
}

// Default value functions
fn default_storage_backend() -> String {
    "file".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_seed() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_access_token_expiry() -> i64 {
    3600
}
fn default_refresh_token_expiry() -> i64 {
    604800
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_base_latency_ms() -> u64 {
    800
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_jobs_enabled() -> bool {
    true
}
fn default_reminder_interval_minutes() -> u64 {
    15
}
fn default_metrics_interval_secs() -> u64 {
    30
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const TEST_DEFAULTS: &str = r#"
    [storage]
    backend = "memory"
    data_dir = "data"
    seed = true

    [logging]
    level = "info"
    format = "pretty"

    [auth]
    jwt_secret = "test_secret_key_for_session_tokens_0123456789"
    access_token_expiry_secs = 3600
    refresh_token_expiry_secs = 604800
    leeway_secs = 0

    [network]
    base_latency_ms = 0
    timeout_ms = 5000

    [jobs]
    enabled = false
    reminder_interval_minutes = 15
    metrics_interval_secs = 30
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CIBES__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CIBES").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Configuration for tests: memory storage, no latency, jobs off.
    ///
    /// Built from embedded defaults plus `overrides`, without touching the
    /// file system. Validation is skipped so tests can build partial configs.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(TEST_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match self.storage.backend.as_str() {
            "memory" => {}
            "file" => {
                if self.storage.data_dir.as_os_str().is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "CIBES__STORAGE__DATA_DIR must be set for the file backend".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown storage backend: {}",
                    other
                )))
            }
        }

        if !self.auth.jwt_secret.is_empty()
            && self.auth.jwt_secret.len() < shared::jwt::MIN_SECRET_LEN
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "CIBES__AUTH__JWT_SECRET must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if self.auth.access_token_expiry_secs <= 0 || self.auth.refresh_token_expiry_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Token expiry must be positive".to_string(),
            ));
        }

        if self.auth.refresh_token_expiry_secs < self.auth.access_token_expiry_secs {
            return Err(ConfigValidationError::InvalidValue(
                "refresh_token_expiry_secs cannot be shorter than access_token_expiry_secs"
                    .to_string(),
            ));
        }

        if self.network.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Network timeout cannot be 0".to_string(),
            ));
        }

        if self.network.timeout_ms <= self.network.base_latency_ms {
            return Err(ConfigValidationError::InvalidValue(
                "timeout_ms must exceed base_latency_ms".to_string(),
            ));
        }

        Ok(())
    }

    pub fn base_latency(&self) -> Duration {
        Duration::from_millis(self.network.base_latency_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.network.timeout_ms)
    }
}
