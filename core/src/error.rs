//! Error type shared by every Knack client.
//!
//! # Design
//! Failures are surfaced exactly as they happened: a non-2xx response keeps
//! its raw status and body, and transport failures keep their source error.
//! Nothing here retries or reclassifies; the caller decides what to do.

use thiserror::Error;

/// Errors returned by the HTTP and Knack clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, IO).
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload or filter could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A required configuration value was not set.
    #[error("missing configuration value `{0}`")]
    MissingConfig(&'static str),
}

impl ApiError {
    /// HTTP status carried by the error, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
