//! Client configuration for the hub connection

use crate::error::{Result, UploadError};
use serde::{Deserialize, Serialize};

/// Hub REST API version used for file upload endpoints
pub const DEFAULT_API_VERSION: &str = "2016-02-03";

/// Default timeout, in seconds, applied to every HTTP request
pub const DEFAULT_TIMEOUT_SECS: u64 = 240;

const DEFAULT_USER_AGENT: &str = concat!("hub-file-upload/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a single device
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name of the hub, e.g. `contoso.azure-devices.net`
    #[serde(rename = "hostname")]
    pub hostname: String,

    /// Identity of this device on the hub
    #[serde(rename = "device-id")]
    pub device_id: String,

    /// Pre-signed `SharedAccessSignature ...` credential sent as `authorization`
    #[serde(rename = "sas-token")]
    pub sas_token: String,

    /// REST API version appended to hub requests
    #[serde(rename = "api-version", default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(rename = "timeout", default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with hub and storage requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("device_id", &self.device_id)
            .field("sas_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        hostname: impl Into<String>,
        device_id: impl Into<String>,
        sas_token: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            device_id: device_id.into(),
            sas_token: sas_token.into(),
            api_version: default_api_version(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }

    /// Parse a device connection string
    ///
    /// Expects `HostName=...;DeviceId=...;SharedAccessSignature=...` with the
    /// keys in any order. Values may themselves contain `=`.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut hostname = None;
        let mut device_id = None;
        let mut sas_token = None;

        for part in connection_string.split(';').map(str::trim) {
            if part.is_empty() {
                continue;
            }

            let (key, value) = part.split_once('=').ok_or_else(|| {
                UploadError::config_error(format!("Malformed connection string segment: {}", part))
            })?;

            match key {
                "HostName" => hostname = Some(value.to_string()),
                "DeviceId" => device_id = Some(value.to_string()),
                "SharedAccessSignature" => sas_token = Some(value.to_string()),
                _ => log::debug!("Ignoring connection string key {}", key),
            }
        }

        let config = Self::new(
            hostname.ok_or_else(|| {
                UploadError::config_error("Connection string is missing HostName")
            })?,
            device_id.ok_or_else(|| {
                UploadError::config_error("Connection string is missing DeviceId")
            })?,
            sas_token.ok_or_else(|| {
                UploadError::config_error("Connection string is missing SharedAccessSignature")
            })?,
        );
        config.validate()?;
        Ok(config)
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            return Err(UploadError::invalid_parameter(
                "hostname",
                "Hub host name cannot be empty",
            ));
        }

        if self.hostname.contains('/') || self.hostname.contains(char::is_whitespace) {
            return Err(UploadError::invalid_parameter(
                "hostname",
                "Hub host name must be a bare host, without scheme or path",
            ));
        }

        if self.device_id.is_empty() {
            return Err(UploadError::invalid_parameter(
                "device_id",
                "Device id cannot be empty",
            ));
        }

        if self.sas_token.is_empty() {
            return Err(UploadError::invalid_parameter(
                "sas_token",
                "SAS token cannot be empty",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(UploadError::invalid_parameter(
                "timeout",
                "Timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
