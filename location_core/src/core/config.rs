use std::{fs, path::Path, time::Duration};

use log::debug;
use serde::{Deserialize, Serialize};

use super::errors::ApiError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:50051";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// One day. Far below what the grpc-timeout header can encode.
pub const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1_000;

/// Where the Location service lives and how long a single call may take.
///
/// JSON looks like: `{ "address":"locations.internal:50051", "timeout_ms":3000 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` or a full `http://host:port` URI.
    pub address: String,
    /// Applied uniformly to every operation.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        debug!("Loading client config from {:?}", path);
        let file = fs::File::open(path)
            .map_err(|e| ApiError::Config(format!("could not open {:?}: {e}", path)))?;
        let config: ClientConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.address.trim().is_empty() {
            return Err(ApiError::Config("address must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ApiError::Config("timeout_ms must be greater than zero".into()));
        }
        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ApiError::Config(format!(
                "timeout_ms must be at most {MAX_TIMEOUT_MS}, got {}",
                self.timeout_ms
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
