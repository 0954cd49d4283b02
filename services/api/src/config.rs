//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;
use typespark_core::SegmentationLimits;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Parent directory of the stats namespace.
    pub data_dir: PathBuf,
    pub cors_origin: String,
    /// Request body limit in bytes.
    pub max_content_size: usize,
    /// Limit on decoded document text in bytes.
    pub max_document_size: usize,
    /// Pages read from an uploaded PDF.
    pub max_pdf_pages: usize,
    pub segmentation: SegmentationLimits,
    /// `None` disables idle-session eviction.
    pub session_idle_timeout: Option<Duration>,
    pub eviction_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5002)),
            log_level: Level::INFO,
            data_dir: PathBuf::from("./data"),
            cors_origin: "*".to_string(),
            max_content_size: 10 * 1024 * 1024,
            max_document_size: 50 * 1024,
            max_pdf_pages: 10,
            segmentation: SegmentationLimits::default(),
            session_idle_timeout: Some(Duration::from_secs(3600)),
            eviction_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", defaults.bind_address)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let data_dir = lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Content Limits ---
        let max_content_size = parse_or(&lookup, "MAX_CONTENT_SIZE", defaults.max_content_size)?;
        let max_document_size =
            parse_or(&lookup, "MAX_CONTENT_SIZE_PER_DOC", defaults.max_document_size)?;
        let max_pdf_pages = parse_or(&lookup, "MAX_PDF_PAGES", defaults.max_pdf_pages)?;
        if max_pdf_pages == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_PDF_PAGES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let base = defaults.segmentation;
        let segmentation = SegmentationLimits {
            short_text_threshold: parse_or(&lookup, "SHORT_TEXT_THRESHOLD", base.short_text_threshold)?,
            min_paragraph_chars: parse_or(&lookup, "MIN_PARAGRAPH_CHARS", base.min_paragraph_chars)?,
            max_items: parse_or(&lookup, "MAX_ITEMS", base.max_items)?,
            max_item_chars: parse_or(&lookup, "MAX_ITEM_CHARS", base.max_item_chars)?,
        }
        .validated();

        // --- Session Lifecycle ---
        let idle_secs: u64 = parse_or(&lookup, "SESSION_IDLE_TIMEOUT_SECS", 3600)?;
        let session_idle_timeout = (idle_secs > 0).then(|| Duration::from_secs(idle_secs));
        let interval_secs: u64 = parse_or(&lookup, "EVICTION_INTERVAL_SECS", 300)?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "EVICTION_INTERVAL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            data_dir,
            cors_origin,
            max_content_size,
            max_document_size,
            max_pdf_pages,
            segmentation,
            session_idle_timeout,
            eviction_interval: Duration::from_secs(interval_secs),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
