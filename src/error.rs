//! Error types for the monitoring engine
//!
//! Probe failures are not represented here: a failed probe is recorded as a
//! null-valued [`Measurement`](crate::Measurement) instead.

use std::fmt;

/// Result type alias for monitoring operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors that can occur while running a monitoring cycle
#[derive(Debug)]
pub enum MonitorError {
    /// A threshold expression could not be parsed
    InvalidExpression { expression: String, reason: String },

    /// The resource configuration could not be loaded
    ConfigUnavailable(String),

    /// An external backend (alarms, metrics, dashboard) rejected or failed a call
    BackendUnavailable {
        backend: &'static str,
        message: String,
    },

    /// (De)serialization of configuration or payloads failed
    Serialization(String),

    /// I/O error (file access, etc.)
    Io(std::io::Error),
}

impl MonitorError {
    pub fn invalid_expression(expression: &str, reason: impl Into<String>) -> Self {
        MonitorError::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        MonitorError::BackendUnavailable {
            backend,
            message: message.into(),
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::InvalidExpression { expression, reason } => {
                write!(f, "invalid threshold expression '{}': {}", expression, reason)
            }
            MonitorError::ConfigUnavailable(msg) => {
                write!(f, "resource configuration unavailable: {}", msg)
            }
            MonitorError::BackendUnavailable { backend, message } => {
                write!(f, "{} backend unavailable: {}", backend, message)
            }
            MonitorError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            MonitorError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err)
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Serialization(err.to_string())
    }
}
