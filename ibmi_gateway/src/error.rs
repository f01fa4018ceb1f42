//! Typed error types for the gateway.

/// All errors produced by the gateway library.
///
/// Each variant maps to one outcome kind at the caller boundary; nothing
/// here is ever retried, and no error crosses the tool layer un-flattened.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid builder input (object names, type filters).
    #[error(transparent)]
    Input(#[from] ibmi_gateway_core::Error),

    /// Command failed validation. Never causes a connection attempt.
    #[error("{0}")]
    Security(String),

    /// Required settings are missing or malformed.
    #[error("{0}")]
    Config(String),

    /// Transport, handshake, or authentication failure while opening a
    /// session.
    #[error("{phase}: {message}")]
    Connection {
        phase: &'static str,
        message: String,
    },

    /// Transport failure while running an already-connected command.
    #[error("{0}")]
    Execution(String),

    #[error("{0}")]
    Mcp(String),
}

/// A `Result` alias where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
