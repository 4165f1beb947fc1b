//! Error types for the docchat application.

use thiserror::Error;

use crate::remote::RunStatus;

/// Coarse classification of a [`DocchatError`].
///
/// Callers branch on the kind instead of matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    Remote,
    Timeout,
    Cancelled,
    RunFailed,
    EmptyResponse,
    Io,
    Serialization,
    Config,
}

/// A shared error type for the entire docchat application.
#[derive(Error, Debug, Clone)]
pub enum DocchatError {
    /// A client or handle required for the operation is missing
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// A remote service returned an error or could not be reached
    #[error("{service} API error: {message}")]
    Remote {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// A bounded wait gave up before the remote side finished
    #[error("Timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The wait was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// A run reached a terminal state other than `completed`
    #[error("Run '{run_id}' ended with status '{status}'")]
    RunFailed { run_id: String, status: RunStatus },

    /// The remote side finished but produced nothing usable
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocchatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotConfigured error
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }

    /// Creates a Remote error
    pub fn remote(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            service,
            status,
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured(_) => ErrorKind::NotConfigured,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::RunFailed { .. } => ErrorKind::RunFailed,
            Self::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status reported by the remote side, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DocchatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DocchatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DocchatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DocchatError>`.
pub type Result<T> = std::result::Result<T, DocchatError>;
