//! Configuration module for ragsync.
//!
//! Provides typed configuration structs, loading from an optional YAML file
//! and from environment-style key/value pairs, validation, defaults, and a
//! builder for programmatic use.
//!
//! Resolution order: defaults, then the YAML file named by `RAGSYNC_CONFIG`
//! (if any), then environment variables. Empty environment values are
//! treated as unset.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::normalize_prefix;

/// Interval used when neither the file nor the environment sets one.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30 * 60;

/// Default remote indexing service base URL.
pub const DEFAULT_INDEX_API_URL: &str = "https://swiss-german.app.sb.wonderful.ai";

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "RAGSYNC_CONFIG";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for ragsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub object_store: ObjectStoreConfig,
    pub index: IndexConfig,
    pub sync: SyncConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Object store (S3) settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// Bucket to mirror. Required.
    pub bucket: String,
    /// Key prefix; stored normalized (no leading/trailing `/`). Empty = whole bucket.
    pub prefix: String,
    /// AWS region used for request signing.
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    pub endpoint_url: Option<String>,
    /// Static access key id. Requests are unsigned when absent.
    pub access_key_id: Option<String>,
    /// Static secret access key.
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

/// Remote indexing service settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Base URL of the service API.
    pub api_url: String,
    /// Target collection (RAG) identifier. Required.
    pub rag_id: String,
    /// Bearer API key. Required.
    pub api_key: String,
    /// Per-call timeout in seconds for every network step.
    pub request_timeout_secs: u64,
}

/// Synchronization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between timer passes, fractions allowed. `None` falls back to
    /// [`DEFAULT_SYNC_INTERVAL_SECS`].
    pub interval_secs: Option<f64>,
    /// Objects larger than this (in MiB) are rejected. 0 = unlimited.
    pub max_file_size_mb: u64,
}

/// Control surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port the control surface listens on.
    pub port: u16,
    /// Seconds open connections get to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `json` or `pretty`.
    pub format: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: String::new(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_INDEX_API_URL.to_string(),
            rag_id: String::new(),
            api_key: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            shutdown_grace_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

// Secrets never appear in Debug output.
impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.masked_access_key_id())
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Debug for IndexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConfig")
            .field("api_url", &self.api_url)
            .field("rag_id", &self.rag_id)
            .field("api_key", &"***")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ObjectStoreConfig {
    /// Access key id safe for logs: `AKIA...WXYZ`, or `***` for short keys.
    pub fn masked_access_key_id(&self) -> Option<String> {
        self.access_key_id.as_deref().map(mask_secret)
    }

    /// Returns true if both static keys are configured.
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.as_deref().is_some_and(|k| !k.is_empty())
            && self
                .secret_access_key
                .as_deref()
                .is_some_and(|k| !k.is_empty())
    }
}

fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.object_store.prefix = normalize_prefix(&config.object_store.prefix);
        Ok(config)
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// Loads the YAML file named by `RAGSYNC_CONFIG` when present, then
    /// overlays environment values. Malformed numeric values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(&lookup, CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        let errors = config.apply_env(&lookup);
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            anyhow::bail!("Invalid environment configuration: {joined}");
        }

        Ok(config)
    }

    /// Overlay environment values onto this configuration.
    ///
    /// Returns parse errors for malformed numeric values; well-formed
    /// values are applied even when others fail.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        // --- object store ---
        if let Some(v) = non_empty(&lookup, "AWS_REGION") {
            self.object_store.region = v;
        }
        if let Some(v) = non_empty(&lookup, "AWS_ACCESS_KEY_ID") {
            self.object_store.access_key_id = Some(v);
        }
        if let Some(v) = non_empty(&lookup, "AWS_SECRET_ACCESS_KEY") {
            self.object_store.secret_access_key = Some(v);
        }
        if let Some(v) = non_empty(&lookup, "AWS_SESSION_TOKEN") {
            self.object_store.session_token = Some(v);
        }
        if let Some(v) = non_empty(&lookup, "S3_ENDPOINT_URL") {
            self.object_store.endpoint_url = Some(v);
        }
        if let Some(v) = non_empty(&lookup, "S3_BUCKET") {
            self.object_store.bucket = v;
        }
        if let Some(v) = non_empty(&lookup, "S3_PREFIX") {
            self.object_store.prefix = normalize_prefix(&v);
        }

        // --- index service ---
        if let Some(v) = non_empty(&lookup, "WONDERFUL_API_URL") {
            self.index.api_url = v;
        }
        if let Some(v) = non_empty(&lookup, "WONDERFUL_RAG_ID") {
            self.index.rag_id = v;
        }
        if let Some(v) = non_empty(&lookup, "WONDERFUL_API_KEY") {
            self.index.api_key = v;
        }
        if let Some(v) = parse_env::<u64, _>(&lookup, "REQUEST_TIMEOUT_SECONDS", &mut errors) {
            self.index.request_timeout_secs = v;
        }

        // --- sync ---
        // Seconds are preferred; minutes are the legacy variable.
        if non_empty(&lookup, "SYNC_INTERVAL_SECONDS").is_some() {
            if let Some(secs) = parse_interval(&lookup, "SYNC_INTERVAL_SECONDS", &mut errors) {
                self.sync.interval_secs = Some(secs);
            }
        } else if let Some(mins) = parse_interval(&lookup, "SYNC_INTERVAL_MINUTES", &mut errors) {
            self.sync.interval_secs = Some(mins * 60.0);
        }
        if let Some(v) = parse_env::<u64, _>(&lookup, "MAX_FILE_SIZE_MB", &mut errors) {
            self.sync.max_file_size_mb = v;
        }

        // --- server / logging ---
        if let Some(v) = parse_env::<u16, _>(&lookup, "PORT", &mut errors) {
            self.server.port = v;
        }
        if let Some(v) = non_empty(&lookup, "LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        if let Some(v) = non_empty(&lookup, "LOG_FORMAT") {
            self.logging.format = v.to_lowercase();
        }

        errors
    }

    /// Effective interval between timer passes.
    ///
    /// Values `validate()` rejects fall back to the default.
    pub fn sync_interval(&self) -> Duration {
        self.sync
            .interval_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|interval| !interval.is_zero())
            .unwrap_or(Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS))
    }

    /// Size limit in bytes; 0 means unlimited.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.sync.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Per-call network timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.index.request_timeout_secs)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T, F>(lookup: &F, key: &str, errors: &mut Vec<ValidationError>) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(ValidationError {
                field: key.to_string(),
                message: format!("not a valid number: {raw:?}"),
            });
            None
        }
    }
}

/// Parses a possibly fractional interval amount; negative or non-finite
/// values are reported.
fn parse_interval<F>(lookup: &F, key: &str, errors: &mut Vec<ValidationError>) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_env::<f64, F>(lookup, key, errors)?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        errors.push(ValidationError {
            field: key.to_string(),
            message: format!("must be a non-negative number, got {value}"),
        });
        None
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"object_store.bucket"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `logging.format`.
const VALID_LOG_FORMATS: &[&str] = &["json", "pretty"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ValidationError {
                field: field.into(),
                message: message.into(),
            });
        };

        // --- object_store ---
        if self.object_store.bucket.trim().is_empty() {
            push("object_store.bucket", "is required (S3_BUCKET)");
        }
        if self.object_store.region.trim().is_empty() {
            push("object_store.region", "must not be empty");
        }
        if self.object_store.access_key_id.is_some() != self.object_store.secret_access_key.is_some()
        {
            push(
                "object_store.secret_access_key",
                "access key id and secret access key must be set together",
            );
        }
        if let Some(endpoint) = &self.object_store.endpoint_url {
            if !is_http_url(endpoint) {
                push("object_store.endpoint_url", "must start with http:// or https://");
            }
        }

        // --- index ---
        if !is_http_url(&self.index.api_url) {
            push("index.api_url", "must start with http:// or https://");
        }
        if self.index.rag_id.trim().is_empty() {
            push("index.rag_id", "is required (WONDERFUL_RAG_ID)");
        }
        if self.index.api_key.trim().is_empty() {
            push("index.api_key", "is required (WONDERFUL_API_KEY)");
        }
        if self.index.request_timeout_secs == 0 {
            push("index.request_timeout_secs", "must be greater than 0");
        }

        // --- sync ---
        if let Some(secs) = self.sync.interval_secs {
            if !secs.is_finite() || Duration::try_from_secs_f64(secs).map_or(true, |d| d.is_zero())
            {
                push("sync.interval_secs", "must be a finite number greater than 0");
            }
        }

        // --- server ---
        if self.server.port == 0 {
            push("server.port", "must be greater than 0");
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            push(
                "logging.level",
                &format!("must be one of {}", VALID_LOG_LEVELS.join(", ")),
            );
        }
        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            push(
                "logging.format",
                &format!("must be one of {}", VALID_LOG_FORMATS.join(", ")),
            );
        }

        errors
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // -- object_store --

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.object_store.bucket = bucket.into();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.object_store.prefix = normalize_prefix(prefix);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.object_store.region = region.into();
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.object_store.endpoint_url = Some(url.into());
        self
    }

    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.config.object_store.access_key_id = Some(access_key_id.into());
        self.config.object_store.secret_access_key = Some(secret_access_key.into());
        self
    }

    // -- index --

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.index.api_url = url.into();
        self
    }

    pub fn rag_id(mut self, rag_id: impl Into<String>) -> Self {
        self.config.index.rag_id = rag_id.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.index.api_key = api_key.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.index.request_timeout_secs = secs;
        self
    }

    // -- sync --

    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.config.sync.interval_secs = Some(secs as f64);
        self
    }

    pub fn max_file_size_mb(mut self, mb: u64) -> Self {
        self.config.sync.max_file_size_mb = mb;
        self
    }

    // -- server / logging --

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    /// Build without validation.
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate, returning every problem found.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let errors = self.config.validate();
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
