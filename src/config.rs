//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::onboarding::state::DeviceType;

/// Default backend address used by the web client.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Connection settings for the remote onboarding and profile resources.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_base: String,
    /// Bearer token sent with every request.
    pub id_token: SecretString,
    /// Device class the onboarding progress is tracked for.
    pub device_type: DeviceType,
    /// Per-request timeout. A timeout is reported like any other transport failure.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>, id_token: SecretString) -> Self {
        let api_base: String = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            id_token,
            device_type: DeviceType::Web,
            timeout: Duration::from_secs(15),
        }
    }

    /// Build config from environment variables.
    ///
    /// `FINAPP_ID_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base =
            std::env::var("FINAPP_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let id_token = std::env::var("FINAPP_ID_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("FINAPP_ID_TOKEN".to_string()))?;

        let device_type = match std::env::var("FINAPP_DEVICE_TYPE") {
            Ok(raw) => raw
                .parse::<DeviceType>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "FINAPP_DEVICE_TYPE".to_string(),
                    message,
                })?,
            Err(_) => DeviceType::Web,
        };

        let timeout_secs: u64 = std::env::var("FINAPP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        Ok(Self {
            device_type,
            timeout: Duration::from_secs(timeout_secs),
            ..Self::new(api_base, SecretString::from(id_token))
        })
    }

    /// Join a resource path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}
