//! # Client Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client error categories                            │
//! │                                                                         │
//! │  Transport        request never got a response (DNS, TLS, refused)     │
//! │  Status           non-2xx; message = body.error or the status text     │
//! │  Rejected         2xx body that carries an `error` field               │
//! │  Decode           response body is not the expected JSON               │
//! │  InvalidUrl       configured base / CDN URL is unusable                │
//! │  Io               local file store failure                             │
//! │                                                                         │
//! │  None of these is fatal: the presenter logs them and shows             │
//! │  `user_message()` in the UI.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use larek_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request failed before a response arrived.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The server accepted the request but reported an error in the body.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A configured URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Local storage failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text suitable for showing to the shopper.
    ///
    /// Server-provided messages are passed through unchanged.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        CoreError::Storage(err.to_string())
    }
}
