//! Configuration module
//!
//! This module provides configuration structures for the conversion service,
//! including server, storage, conversion, and cleanup settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    CONVERTED_DIR_NAME, DEFAULT_QUALITY, DEFAULT_WEBP_EFFORT, INCOMING_DIR_NAME, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::delivery::DeliveryMode;

// Common constants
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_FILES: usize = 20;
const CLEANUP_INTERVAL_MINUTES: u64 = 60;
const FILE_MAX_AGE_HOURS: u64 = 24;
const CONVERSION_TIMEOUT_SECS: u64 = 60;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_STORAGE_ROOT: &str = "./data";

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    /// `json` switches the log formatter to structured JSON lines
    pub log_format: String,
}

/// Conversion service configuration
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub base: BaseConfig,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_files: usize,
    pub allowed_content_types: Vec<String>,
    // Conversion
    pub default_quality: u8,
    pub webp_effort: u8,
    pub conversion_timeout_secs: u64,
    pub max_concurrent_conversions: usize,
    pub delivery_mode: DeliveryMode,
    // Ephemeral storage
    pub storage_root: PathBuf,
    pub cleanup_enabled: bool,
    pub cleanup_interval_minutes: u64,
    pub file_max_age_hours: u64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            log_format: "pretty".to_string(),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files: MAX_FILES,
            allowed_content_types: crate::constants::SUPPORTED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_quality: DEFAULT_QUALITY,
            webp_effort: DEFAULT_WEBP_EFFORT,
            conversion_timeout_secs: CONVERSION_TIMEOUT_SECS,
            max_concurrent_conversions: default_concurrency(),
            delivery_mode: DeliveryMode::Disk,
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            cleanup_enabled: true,
            cleanup_interval_minutes: CLEANUP_INTERVAL_MINUTES,
            file_max_age_hours: FILE_MAX_AGE_HOURS,
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ConverterConfig>);

impl Default for Config {
    fn default() -> Self {
        Config(Box::default())
    }
}

impl Config {
    fn as_converter(&self) -> &ConverterConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_converter().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ConverterConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_converter().validate()
    }

    pub fn host(&self) -> &str {
        &self.as_converter().base.host
    }

    pub fn server_port(&self) -> u16 {
        self.as_converter().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_converter().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_converter().base.environment
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.as_converter().base.request_timeout_secs)
    }

    pub fn log_json(&self) -> bool {
        self.as_converter().base.log_format.eq_ignore_ascii_case("json")
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_converter().max_file_size_bytes
    }

    /// Upload limit in whole megabytes, as reported by the info endpoint
    pub fn max_file_size_mb(&self) -> usize {
        self.as_converter().max_file_size_bytes / (1024 * 1024)
    }

    pub fn max_files(&self) -> usize {
        self.as_converter().max_files
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_converter().allowed_content_types
    }

    pub fn default_quality(&self) -> u8 {
        self.as_converter().default_quality
    }

    pub fn webp_effort(&self) -> u8 {
        self.as_converter().webp_effort
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.as_converter().conversion_timeout_secs)
    }

    pub fn max_concurrent_conversions(&self) -> usize {
        self.as_converter().max_concurrent_conversions
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.as_converter().delivery_mode
    }

    pub fn storage_root(&self) -> &PathBuf {
        &self.as_converter().storage_root
    }

    pub fn incoming_dir(&self) -> PathBuf {
        self.as_converter().storage_root.join(INCOMING_DIR_NAME)
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.as_converter().storage_root.join(CONVERTED_DIR_NAME)
    }

    pub fn cleanup_enabled(&self) -> bool {
        self.as_converter().cleanup_enabled
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.as_converter().cleanup_interval_minutes.saturating_mul(60))
    }

    pub fn file_max_age(&self) -> Duration {
        Duration::from_secs(self.as_converter().file_max_age_hours.saturating_mul(3600))
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(default)
}

impl ConverterConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                crate::constants::SUPPORTED_CONTENT_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let delivery_mode = match env::var("DELIVERY_MODE") {
            Ok(value) => value.parse::<DeliveryMode>()?,
            Err(_) => DeliveryMode::Disk,
        };

        let base = BaseConfig {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        Ok(ConverterConfig {
            base,
            max_file_size_bytes: max_file_size_mb
                .checked_mul(1024 * 1024)
                .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"))?,
            max_files: env::var("MAX_FILES")
                .unwrap_or_else(|_| MAX_FILES.to_string())
                .parse()
                .unwrap_or(MAX_FILES),
            allowed_content_types,
            default_quality: env::var("DEFAULT_QUALITY")
                .unwrap_or_else(|_| DEFAULT_QUALITY.to_string())
                .parse()
                .unwrap_or(DEFAULT_QUALITY),
            webp_effort: env::var("WEBP_EFFORT")
                .unwrap_or_else(|_| DEFAULT_WEBP_EFFORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_WEBP_EFFORT),
            conversion_timeout_secs: env::var("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| CONVERSION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            max_concurrent_conversions: env::var("MAX_CONCURRENT_CONVERSIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_concurrency),
            delivery_mode,
            storage_root: PathBuf::from(
                env::var("STORAGE_ROOT").unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string()),
            ),
            cleanup_enabled: env_flag("CLEANUP_ENABLED", true),
            cleanup_interval_minutes: env::var("CLEANUP_INTERVAL_MINUTES")
                .unwrap_or_else(|_| CLEANUP_INTERVAL_MINUTES.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_MINUTES),
            file_max_age_hours: env::var("FILE_MAX_AGE_HOURS")
                .unwrap_or_else(|_| FILE_MAX_AGE_HOURS.to_string())
                .parse()
                .unwrap_or(FILE_MAX_AGE_HOURS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be greater than 0"));
        }

        if self.max_file_size_bytes.checked_mul(self.max_files).is_none() {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB x MAX_FILES does not fit in memory addressing"
            ));
        }

        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.default_quality) {
            return Err(anyhow::anyhow!(
                "DEFAULT_QUALITY must be between {} and {}",
                MIN_QUALITY,
                MAX_QUALITY
            ));
        }

        if self.webp_effort > 6 {
            return Err(anyhow::anyhow!("WEBP_EFFORT must be between 0 and 6"));
        }

        if self.conversion_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CONVERSION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.max_concurrent_conversions == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_CONVERSIONS must be greater than 0"
            ));
        }

        if self.cleanup_enabled && self.cleanup_interval_minutes == 0 {
            return Err(anyhow::anyhow!(
                "CLEANUP_INTERVAL_MINUTES must be greater than 0 when cleanup is enabled"
            ));
        }

        if self.cleanup_interval_minutes.checked_mul(60).is_none() {
            return Err(anyhow::anyhow!("CLEANUP_INTERVAL_MINUTES is too large"));
        }

        if self.file_max_age_hours.checked_mul(3600).is_none() {
            return Err(anyhow::anyhow!("FILE_MAX_AGE_HOURS is too large"));
        }

        if is_production_env(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}
