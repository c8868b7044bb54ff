//! # Configuration Management

//! This module handles the configuration loading and management for the IQX Dock Queue service.
//! It leverages the `config` crate to provide a flexible and structured way to define and access configuration settings from various sources, including:

//! * YAML configuration files (default.yaml, development.yaml, production.yaml)
//! * Environment variables

//! The core of this module is the `Settings` struct, which encapsulates all the configuration settings required by the service.

use serde::{Deserialize, Serialize};
use config::{Config, Environment, File};
use std::{env, fmt};
use std::path::PathBuf;
use secrecy::Secret;
use log::debug;
use url::Url;
use crate::errors::DockQueueError;

/// Represents the complete set of configuration settings for the IQX Dock Queue.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Settings for reaching the record store
    pub store: StoreSettings,
    /// Settings for the outbound messaging provider
    pub notification: NotificationSettings,
    /// The warehouse coordinate and admission radius for check-in
    pub geofence: GeofenceSettings,
    /// Queue numbering and check-in form rules
    pub queue: QueueSettings,
    /// Dashboard refresh cadence
    pub polling: PollingSettings,
    /// Settings for application logging
    pub logging: LoggingSettings,
}

/// Which record store implementation backs the service
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Rows are sent to the remote request/response API
    Http,
    /// Rows live in process memory (development and tests)
    Memory,
}

/// # Store Settings

/// This struct holds the configuration settings required to reach the record store
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// The store implementation to use
    pub backend: StoreBackend,
    /// The API endpoint accepting `{action, table, data}` requests
    pub endpoint: String,
    /// Bearer key sent with every request (optional)
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub api_key: Option<Secret<String>>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum number of driver rows returned by a read
    pub drivers_window: usize,
    /// Maximum number of activity log rows returned by a read
    pub logs_window: usize,
    /// Base URL under which uploaded documents are published (memory backend)
    pub public_document_base: String,
}

impl StoreSettings {
    /// Parses the configured endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` when the endpoint is a valid absolute URL
    /// * `Err(DockQueueError::ConfigError)` otherwise
    pub fn endpoint_url(&self) -> Result<Url, DockQueueError> {
        Ok(Url::parse(&self.endpoint)?)
    }
}

/// Holds the configuration for the messaging provider used for driver and group notifications
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    /// When true, messages are only written to the log
    pub dev_mode: bool,
    /// The provider's send endpoint
    pub api_url: String,
    /// The provider token sent in the `Authorization` header
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub token: Option<Secret<String>>,
    /// Group destination for entry approval messages
    pub group_target: String,
    /// Default country code applied by the provider to local numbers
    pub country_code: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

/// Holds the warehouse coordinate used by the check-in geofence
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeofenceSettings {
    pub site_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Admission radius in meters
    pub max_distance_meters: f64,
}

/// Holds queue numbering and check-in form rules
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueueSettings {
    /// Gate whose queue numbers carry the `A` prefix
    pub priority_gate: String,
    /// PIC locked in for SBI purchase orders
    pub sbi_pic: String,
    /// PIC locked in for SDI purchase orders
    pub sdi_pic: String,
    /// Largest inline document payload accepted at check-in, in bytes
    pub max_document_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PollingSettings {
    pub interval_secs: u64,  // in seconds
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error")
    pub level: String,
    /// The name of the log file (optional)
    pub file: Option<String>,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}


/// # Settings Initialization
///
/// The `Settings` implementation provides a `new` function to load and construct the configuration settings.
impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// This function reads configuration settings from the following sources, in order of precedence:
    ///
    /// 1. `default.yaml`: Contains default settings for the service
    /// 2. Environment-specific YAML file (e.g., `development.yaml` or `production.yaml`) based on the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g., `APP__STORE__ENDPOINT`)
    ///
    /// The `CONFIG_DIR` environment variable can be used to specify the directory where the YAML configuration files are located (defaults to "src/config").
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)`: If the settings were loaded and constructed successfully
    /// * `Err(DockQueueError)`: If there was an error during the loading or construction process
    pub fn new() -> Result<Self, DockQueueError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut s: Self = s.try_deserialize::<Settings>()
            .map_err(DockQueueError::from)?;

        if let Some(ref mut path) = s.logging.path {
            *path = env::current_dir()?.join(path.clone());
        }

        s.validate()?;
        Ok(s)
    }

    /// Rejects settings the service cannot run with
    pub fn validate(&self) -> Result<(), DockQueueError> {
        if self.store.backend == StoreBackend::Http {
            self.store.endpoint_url()?;
        }
        if self.geofence.max_distance_meters <= 0.0 {
            return Err(DockQueueError::ConfigError("geofence.max_distance_meters must be positive".into()));
        }
        if self.polling.interval_secs == 0 {
            return Err(DockQueueError::ConfigError("polling.interval_secs must be at least 1".into()));
        }
        if self.queue.priority_gate.trim().is_empty() {
            return Err(DockQueueError::ConfigError("queue.priority_gate is empty".into()));
        }
        Ok(())
    }
}

/// Deserializes an optional secret string from configuration into a `Secret<String>`
fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
    where
        D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.is_empty()).map(Secret::new))
}

impl fmt::Display for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreSettings {{ backend: {:?}, endpoint: {}, api_key: {}, timeout_ms: {} }}",
            self.backend,
            self.endpoint,
            if self.api_key.is_some() { "<set>" } else { "<none>" },
            self.timeout_ms
        )
    }
}
