//! Error types for the pub/sub boundary.

use thiserror::Error;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Errors raised at the pub/sub boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BusError {
    /// Topic does not belong to the command namespace.
    #[error("Unknown command topic: {topic}")]
    UnknownTopic { topic: String },

    /// Payload could not be interpreted for its topic.
    #[error("Malformed payload for {topic}: '{payload}' ({reason})")]
    MalformedPayload {
        topic: String,
        payload: String,
        reason: &'static str,
    },

    /// Message dropped by the publish rate limiter.
    #[error("Rate limit exceeded, dropped message to {topic}")]
    RateLimited { topic: String },

    /// The transport refused or lost the message.
    #[error("Transport error on {topic}: {message}")]
    Transport { topic: String, message: String },
}
