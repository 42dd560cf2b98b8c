//! Error types for the Web of Science batch client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from XML post-processing.
#[derive(thiserror::Error, Debug)]
pub enum XmlError {
    /// Markup the reader could not parse (mismatched tags, bad syntax)
    #[error("Malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    /// Character that XML 1.0 does not allow, e.g. a stray control character
    #[error("Illegal XML character U+{code:04X} at byte {position}")]
    IllegalChar {
        /// Unicode scalar value of the offending character
        code: u32,
        /// Byte offset in the input
        position: usize,
    },

    /// Document ended with open elements
    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    /// Output buffer was not valid UTF-8
    #[error("Invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writer failure
    #[error("XML write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the SOAP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// SOAP fault returned by the service (bad query, expired session, throttling)
    #[error("SOAP fault: {message}")]
    Fault {
        /// Content of `faultstring`
        message: String,
    },

    /// Rate limited by the service (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Server error (5xx response without a SOAP fault)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Response envelope lacked a required element
    #[error("Response is missing <{0}>")]
    MissingField(&'static str),

    /// Response element held an unusable value
    #[error("Invalid <{field}> in response: {value}")]
    InvalidField {
        /// Element name
        field: &'static str,
        /// Raw content
        value: String,
    },

    /// Response envelope could not be parsed
    #[error("Failed to parse response: {0}")]
    Xml(#[from] XmlError),

    /// Search issued before `authenticate`
    #[error("No session: call authenticate first")]
    NotAuthenticated,
}

impl ClientError {
    /// Create a SOAP fault error.
    #[must_use]
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault { message: message.into() }
    }

    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from query pagination and batch processing.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    /// Error from the search collaborator
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// XML post-processing error
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// File read or write failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Input or configuration validation failed
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BatchError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
