//! Adapter error types.
//!
//! Every failure talking to a remote service surfaces as a [`RemoteError`].
//! Non-success HTTP responses keep the status code and the response body
//! verbatim so callers can show the server's own explanation.

/// Unified error type for Flowsmith adapters.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    // -- Configuration errors ----------------------------------------------
    /// The configured base URL cannot be used.
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// No usable credentials were supplied.
    #[error("no n8n credentials configured: set an API key or email and password")]
    MissingCredentials,

    // -- Authentication errors ---------------------------------------------
    /// The operation needs authentication and the client has none.  No
    /// request was sent.
    #[error("not authenticated: `{operation}` requires an API key or a session")]
    NotAuthenticated { operation: &'static str },

    // -- Transport errors --------------------------------------------------
    /// The request could not be sent or the response could not be read.
    #[error("{operation}: transport error: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// The server answered with something other than 200 or 201.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A success response whose body is not what the operation expects.
    #[error("{operation}: unexpected response: {reason}")]
    UnexpectedResponse {
        operation: &'static str,
        reason: String,
    },
}

impl RemoteError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, RemoteError>;
