use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::Weekday;

use crate::workflows::archive::JsonFileStore;
use crate::workflows::exams::{OfficeSettings, RandomShuffler, RosterPolicy, WorkloadPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub office: OfficeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            office: OfficeConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the duty document lives and how the engine behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeConfig {
    pub data_path: PathBuf,
    pub rest_day: Weekday,
    pub workload_policy: WorkloadPolicy,
    /// Fixes the invigilation shuffle when set.
    pub shuffle_seed: Option<u64>,
    pub allow_duplicate_names: bool,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("exam_data.json"),
            rest_day: Weekday::Sun,
            workload_policy: WorkloadPolicy::InvigilationOnly,
            shuffle_seed: None,
            allow_duplicate_names: false,
        }
    }
}

impl OfficeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_path = env::var("EXAM_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let rest_day = match env::var("EXAM_REST_DAY") {
            Ok(value) => value
                .trim()
                .parse::<Weekday>()
                .map_err(|_| ConfigError::InvalidRestDay { value })?,
            Err(_) => defaults.rest_day,
        };

        let workload_policy = match env::var("EXAM_WORKLOAD_POLICY") {
            Ok(value) => value
                .parse::<WorkloadPolicy>()
                .map_err(|_| ConfigError::InvalidWorkloadPolicy { value })?,
            Err(_) => defaults.workload_policy,
        };

        let shuffle_seed = match env::var("EXAM_SHUFFLE_SEED") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidShuffleSeed { value })?,
            ),
            Err(_) => None,
        };

        let allow_duplicate_names = match env::var("EXAM_ALLOW_DUPLICATE_NAMES") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                name: "EXAM_ALLOW_DUPLICATE_NAMES",
                value,
            })?,
            Err(_) => defaults.allow_duplicate_names,
        };

        Ok(Self {
            data_path,
            rest_day,
            workload_policy,
            shuffle_seed,
            allow_duplicate_names,
        })
    }

    pub fn settings(&self) -> OfficeSettings {
        OfficeSettings {
            rest_day: self.rest_day,
            roster: RosterPolicy {
                allow_duplicate_names: self.allow_duplicate_names,
            },
        }
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_path)
    }

    pub fn shuffler(&self) -> RandomShuffler {
        RandomShuffler::with_seed(self.shuffle_seed)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRestDay { value: String },
    InvalidWorkloadPolicy { value: String },
    InvalidShuffleSeed { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRestDay { value } => {
                write!(f, "EXAM_REST_DAY must name a weekday, got '{value}'")
            }
            ConfigError::InvalidWorkloadPolicy { value } => write!(
                f,
                "EXAM_WORKLOAD_POLICY must be 'invigilation' or 'all_duties', got '{value}'"
            ),
            ConfigError::InvalidShuffleSeed { value } => {
                write!(f, "EXAM_SHUFFLE_SEED must be a u64, got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
