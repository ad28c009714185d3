//! Error types for the store crate

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to a SPARQL backing store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The endpoint answered with a non-success HTTP status
    #[error("Endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The endpoint answered, but the result document was not usable
    #[error("Unreadable result document: {0}")]
    Results(String),

    /// A graph payload could not be serialized or parsed
    #[error("Graph payload error: {0}")]
    Payload(String),

    /// A named graph required by the operation does not exist
    #[error("Graph not found: {0}")]
    GraphNotFound(String),
}

impl StoreError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a results error
    pub fn results(msg: impl Into<String>) -> Self {
        Self::Results(msg.into())
    }

    /// Create a payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Create a graph not found error
    pub fn graph_not_found(graph: impl Into<String>) -> Self {
        Self::GraphNotFound(graph.into())
    }
}
