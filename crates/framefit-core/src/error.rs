#![forbid(unsafe_code)]

//! Error types for the resize controller.
//!
//! None of these errors ever escape into the host event loop. They are
//! logged at the point where a trigger is handled and the trigger is treated
//! as skipped.

use core::fmt;

/// A failure reported by the embedding host.
///
/// Hosts convert their native error values (for example a thrown JS value)
/// into a message so the controller can log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    operation: &'static str,
    message: String,
}

impl HostError {
    /// Create a host error for `operation` with a free-form message.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// The host operation that failed (e.g. `"viewport"`, `"set_style"`).
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The host-provided failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host {} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for HostError {}

/// Resize controller error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeError {
    /// Neither the identifier nor the direct handle resolved to a live panel.
    TargetNotFound,
    /// The controller has been torn down.
    TornDown,
    /// The host rejected a viewport read or a style write.
    Host(HostError),
}

impl fmt::Display for ResizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound => {
                write!(f, "panel element not found; provide a valid id or element")
            }
            Self::TornDown => write!(f, "resize controller already torn down"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ResizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for ResizeError {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Failure to load a [`ResizeConfig`](crate::options::ResizeConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input was not valid JSON for the config schema.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid resize config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
