use std::fmt::{self, Display};

use thiserror::Error;

/// Boxed cause kept behind every wrapped failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// The per-call deadline elapsed before the service answered.
    Timeout,
    /// The service reported that the requested location does not exist.
    NotFound,
    /// The transport could not reach the service.
    Unavailable,
    Other,
}

impl Display for CallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallErrorKind::Timeout => write!(f, "timeout"),
            CallErrorKind::NotFound => write!(f, "not found"),
            CallErrorKind::Unavailable => write!(f, "unavailable"),
            CallErrorKind::Other => write!(f, "other"),
        }
    }
}

/// A central error enum for everything the Location client can report.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The connection could not be set up; the client is unusable.
    #[error("create LocationApi for '{address}': {source}")]
    ConnectionSetup {
        address: String,
        #[source]
        source: BoxError,
    },

    /// A single operation failed. Never retried by the client.
    #[error("{operation} request failed ({kind}): {source}")]
    RemoteCall {
        operation: &'static str,
        kind: CallErrorKind,
        #[source]
        source: BoxError,
    },

    /// The health call succeeded but the service is not serving.
    #[error("service is unhealthy")]
    Unhealthy,

    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn connection_setup(address: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::ConnectionSetup {
            address: address.into(),
            source: source.into(),
        }
    }

    pub fn remote_call(
        operation: &'static str,
        kind: CallErrorKind,
        source: impl Into<BoxError>,
    ) -> Self {
        ApiError::RemoteCall {
            operation,
            kind,
            source: source.into(),
        }
    }

    /// Classification of a failed remote call, `None` for every other variant.
    pub fn kind(&self) -> Option<CallErrorKind> {
        match self {
            ApiError::RemoteCall { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Name of the operation that failed, if this is a remote call failure.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ApiError::RemoteCall { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == Some(CallErrorKind::Timeout)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(CallErrorKind::NotFound)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, ApiError::Unhealthy)
    }
}

/// Convert from std::io::Error (config files).
impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

/// Convert from serde_json::Error (config files).
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}
