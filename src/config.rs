// Configuration for the LMS client
//
// The LMS connection settings may live either in a "services" subtree or at the
// top level of a JSON configuration document.

use std::fs;
use std::path::Path;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::http_client::Credentials;
use crate::lms::jsonrps::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};

/// Name of the configuration section holding the LMS settings
pub const LMS_SERVICE_NAME: &str = "lms";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No {0} section found in configuration")]
    MissingSection(String),
}

/// Connection settings for a Logitech Media Server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmsConfig {
    /// Hostname or IP address of the server
    pub host: String,

    /// HTTP port of the JSON-RPC API
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl LmsConfig {
    pub fn new(host: &str) -> Self {
        LmsConfig {
            host: host.to_string(),
            port: default_port(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Credentials for HTTP Basic auth. Without a username requests are
    /// unauthenticated, whatever the password says.
    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_deref().map(|username| {
            Credentials::new(username, self.password.as_deref().unwrap_or_default())
        })
    }

    /// Read the LMS section from a configuration document
    pub fn from_value(config: &serde_json::Value) -> Result<Self, ConfigError> {
        let section = get_service_config(config, LMS_SERVICE_NAME)
            .ok_or_else(|| ConfigError::MissingSection(LMS_SERVICE_NAME.to_string()))?;
        Ok(serde_json::from_value(section.clone())?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

/// Helper function to get service configuration
///
/// This function first tries to find the service in the "services" structure,
/// then falls back to the top-level structure.
///
/// # Arguments
/// * `config` - The configuration JSON object
/// * `service_name` - The name of the service to look up (e.g. "lms")
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use lmscontrol::config::get_service_config;
///
/// let config = json!({
///   "services": {
///     "lms": { "host": "192.168.1.10" }
///   }
/// });
///
/// if let Some(lms_config) = get_service_config(&config, "lms") {
///     assert_eq!(lms_config["host"], "192.168.1.10");
/// }
/// ```
pub fn get_service_config<'a>(config: &'a serde_json::Value, service_name: &str) -> Option<&'a serde_json::Value> {
    if let Some(service_config) = config.get("services").and_then(|services| services.get(service_name)) {
        debug!("Found {} configuration in services section", service_name);
        return Some(service_config);
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level", service_name);
        return Some(service_config);
    }

    debug!("No {} configuration found in either services section or top level", service_name);
    None
}
