//! Agent error types.
//!
//! All pipeline subsystems surface errors through [`AgentError`].  Every
//! error maps onto one of the closed [`ErrorKind`] categories, which is what
//! callers branch on.

use std::path::PathBuf;

use serde::Serialize;

use flowsmith_adapters::RemoteError;

/// Closed classification of pipeline failures.
///
/// Structural problems in generated documents are never errors; the
/// validator repairs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A request could not be sent or its response could not be read.
    Transport,
    /// A remote service answered with a non-success status.
    HttpStatus,
    /// The generator produced no usable workflow JSON.
    MalformedGeneration,
    /// An operation needed authentication the client does not have.
    NotAuthenticated,
    /// Required configuration is missing or invalid.
    Configuration,
    /// The outcome record could not be written.
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::HttpStatus => write!(f, "http_status"),
            Self::MalformedGeneration => write!(f, "malformed_generation"),
            Self::NotAuthenticated => write!(f, "not_authenticated"),
            Self::Configuration => write!(f, "configuration"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

impl From<&RemoteError> for ErrorKind {
    fn from(err: &RemoteError) -> Self {
        match err {
            RemoteError::InvalidBaseUrl { .. } | RemoteError::MissingCredentials => {
                Self::Configuration
            }
            RemoteError::NotAuthenticated { .. } => Self::NotAuthenticated,
            RemoteError::Transport { .. } | RemoteError::UnexpectedResponse { .. } => {
                Self::Transport
            }
            RemoteError::Status { .. } => Self::HttpStatus,
        }
    }
}

/// Unified error type for the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- LLM errors ----------------------------------------------------------
    /// An HTTP request to the LLM provider failed.
    #[error("llm request failed: {reason}")]
    LlmRequestFailed { reason: String },

    /// The LLM provider answered with a non-success status.
    #[error("llm provider returned HTTP {status}: {body}")]
    LlmStatus { status: u16, body: String },

    /// The provider response did not have the expected shape.
    #[error("llm response parse error: {reason}")]
    LlmParseFailed { reason: String },

    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    // -- Generation errors ---------------------------------------------------
    /// The generated text contains no parseable workflow JSON.
    #[error("generation produced no workflow JSON: {reason}")]
    MalformedGeneration { reason: String },

    // -- Remote errors -------------------------------------------------------
    /// An error from the workflow server adapter.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    // -- Persistence errors --------------------------------------------------
    /// Writing a result file failed.
    #[error("failed to write result file {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    /// JSON serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // -- Configuration errors ------------------------------------------------
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LlmRequestFailed { .. } => ErrorKind::Transport,
            Self::LlmStatus { .. } => ErrorKind::HttpStatus,
            Self::LlmParseFailed { .. } | Self::MalformedGeneration { .. } => {
                ErrorKind::MalformedGeneration
            }
            Self::MissingApiKey { .. } | Self::Config { .. } => ErrorKind::Configuration,
            Self::Remote(err) => err.into(),
            Self::Persistence { .. } | Self::Json(_) => ErrorKind::Persistence,
        }
    }
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::LlmRequestFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_map_to_kinds() {
        let status = AgentError::from(RemoteError::Status {
            operation: "create_workflow",
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(status.kind(), ErrorKind::HttpStatus);
        assert!(status.to_string().contains("boom"));

        let unauth = AgentError::from(RemoteError::NotAuthenticated {
            operation: "create_workflow",
        });
        assert_eq!(unauth.kind(), ErrorKind::NotAuthenticated);

        let missing = AgentError::from(RemoteError::MissingCredentials);
        assert_eq!(missing.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn generation_errors_are_malformed_generation() {
        let err = AgentError::MalformedGeneration {
            reason: "no braces".into(),
        };
        assert_eq!(err.kind(), ErrorKind::MalformedGeneration);
        assert_eq!(ErrorKind::MalformedGeneration.to_string(), "malformed_generation");
    }
}
