//! Error types for chairlink
//!
//! All failures in the core are terminal at the connection/session boundary:
//! they surface to the presentation layer through the notification queue,
//! never as propagated errors. The variants here exist for callers that want
//! to branch on a local precondition failure (e.g. send-while-disconnected).

use thiserror::Error;

/// Errors produced by the chairlink core
#[derive(Debug, Error)]
pub enum LinkError {
    /// A command was issued while the transport was not open.
    /// The command is dropped, not queued.
    #[error("not connected to controller")]
    NotConnected,

    /// Transport-level failure (connect error, abnormal close)
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for chairlink operations
pub type Result<T> = std::result::Result<T, LinkError>;
