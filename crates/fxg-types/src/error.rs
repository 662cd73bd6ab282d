//! Error types shared across the relay.
//!
//! [`PlatformError`] covers every failure of a chat-platform call,
//! including the user-resolution timeout. [`ConfigError`] covers
//! configuration loading and validation.

use thiserror::Error;

/// A chat-platform operation failed.
///
/// The relay does not classify these as transient or permanent: the
/// message is surfaced to the HTTP caller as-is.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PlatformError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("http error: {0}")]
    Http(String),

    /// The platform answered with a non-success status.
    #[error("Discord API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation exceeded its deadline.
    #[error("{operation} timed out")]
    Timeout {
        /// Human-readable name of the operation that timed out.
        operation: String,
    },

    /// An id is not a Discord snowflake and was not sent.
    #[error("invalid snowflake id: {0:?}")]
    InvalidId(String),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The gateway connection failed.
    #[error("gateway error: {0}")]
    Gateway(String),
}

/// Configuration could not be loaded or is incomplete.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required values are unset.
    #[error("missing required config values: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A value is set but cannot be used.
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Config key (environment variable name).
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The config file could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
