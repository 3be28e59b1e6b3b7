//! Error types for the Scaffold client

use scaffold_core::CoreError;

/// Result type for client operations
pub type ScaffoldResult<T> = std::result::Result<T, ScaffoldError>;

/// Client error types
#[derive(thiserror::Error, Debug)]
pub enum ScaffoldError {
    /// Missing or invalid configuration, raised before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No response from the server
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out
    #[error("Timeout occurred: {0}")]
    Timeout(String),

    /// Token exchange rejected, with the server's message
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response did not match the API contract
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server rejected a command
    #[error("Command failed with status {status}: {message}")]
    CommandFailed {
        /// HTTP status code
        status: u16,
        /// The server's `error` text, or a status summary
        message: String,
    },

    /// Signing or URL codec failure
    #[error("Signing error: {0}")]
    Core(#[from] CoreError),

    /// HTTP client failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not JSON
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file did not parse
    #[error("Config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScaffoldError {
    /// Whether a caller may retry the operation as-is
    ///
    /// The client itself never retries.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScaffoldError::Transport(_) => true,
            ScaffoldError::Timeout(_) => true,
            ScaffoldError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ScaffoldErrorCategory {
        match self {
            ScaffoldError::Configuration(_) | ScaffoldError::Toml(_) | ScaffoldError::Io(_) => {
                ScaffoldErrorCategory::Configuration
            }
            ScaffoldError::Transport(_) | ScaffoldError::Timeout(_) | ScaffoldError::Http(_) => {
                ScaffoldErrorCategory::Transport
            }
            ScaffoldError::AuthenticationFailed(_) => ScaffoldErrorCategory::Authentication,
            ScaffoldError::Protocol(_) | ScaffoldError::Json(_) => ScaffoldErrorCategory::Protocol,
            ScaffoldError::CommandFailed { .. } => ScaffoldErrorCategory::Command,
            ScaffoldError::Core(CoreError::InvalidKey(_)) => ScaffoldErrorCategory::Configuration,
            ScaffoldError::Core(_) => ScaffoldErrorCategory::Protocol,
        }
    }

    /// The server's message for command failures
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ScaffoldError::CommandFailed { message, .. } => Some(message),
            ScaffoldError::AuthenticationFailed(message) => Some(message),
            _ => None,
        }
    }
}

/// Error categories for handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldErrorCategory {
    /// Bad or missing configuration, raised before any I/O
    Configuration,
    /// Network, TLS or timeout failure
    Transport,
    /// Ping or token exchange rejected
    Authentication,
    /// Response did not match the API contract
    Protocol,
    /// Server rejected a command
    Command,
}
