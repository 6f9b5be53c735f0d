//! Error types for the common library.
//!
//! This module provides a unified error hierarchy using `thiserror` for consistent
//! error handling across the MCP servers in this workspace.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration (fatal at startup)
//! - `Error::Api`: Remote API errors (includes endpoint and status)
//! - `Error::Network`: The request never produced an HTTP response
//! - `Error::Decode`: The response body could not be decoded
//! - `Error::Io`: File system operations
//! - `Error::Validation`: Input validation failures
//! - `Error::Precondition`: The remote resource is not in a usable state yet

use thiserror::Error;

/// Unified error type for the common library.
///
/// Every failure an MCP tool can hit maps onto exactly one variant, so the
/// dispatch layer can render a single error string without inspecting the cause.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// API errors with endpoint and HTTP status context
    ///
    /// Used both for non-2xx responses and for 2xx responses whose body
    /// reports an error.
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// Transport failures (DNS, connect, TLS, timeout, reset)
    #[error("Request to {endpoint} failed: {message}")]
    Network {
        /// The API endpoint that was called
        endpoint: String,
        /// Description of the transport failure
        message: String,
    },

    /// Malformed or unexpected response payloads
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode {
        /// The API endpoint that was called
        endpoint: String,
        /// Description of the decoding failure
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested operation cannot run in the resource's current state
    #[error("{0}")]
    Precondition(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use adk_rust_mcp_common::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://api.example.com/v2/video/generate",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("api.example.com"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new network error.
    ///
    /// # Example
    ///
    /// ```
    /// use adk_rust_mcp_common::error::Error;
    ///
    /// let err = Error::network("https://api.example.com/v2/voices", "connection refused");
    /// assert!(err.to_string().contains("connection refused"));
    /// ```
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new decode error.
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use adk_rust_mcp_common::error::Error;
    ///
    /// let err = Error::validation("input_text cannot be empty");
    /// assert!(err.to_string().contains("input_text cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create a new precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition(message.into())
    }

    /// Whether the error was caused by the remote service or the network
    /// rather than by local input or configuration.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::Network { .. } | Error::Decode { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// command-line flags, environment variables or a `.env` file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
