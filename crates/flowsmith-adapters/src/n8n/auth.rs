//! n8n authentication schemes and credentials.

use std::fmt;

/// Public API key header.
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Path prefix of the public API (API-key scheme).
pub const PUBLIC_API_PREFIX: &str = "/api/v1";

/// Path prefix of the internal REST API (session scheme).
pub const REST_PREFIX: &str = "/rest";

/// How an authenticated client talks to the server.  The two schemes are
/// mutually exclusive; authenticating one way discards the other.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// Every request carries the `X-N8N-API-KEY` header and targets the
    /// public API.
    ApiKey { key: String },
    /// A cookie session established by `POST /rest/login`; requests target
    /// the internal REST API.
    Session { email: String },
}

impl AuthScheme {
    /// Path prefix workflow endpoints live under for this scheme.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => PUBLIC_API_PREFIX,
            Self::Session { .. } => REST_PREFIX,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => "api_key",
            Self::Session { .. } => "session",
        }
    }
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { .. } => f.debug_struct("ApiKey").field("key", &"<redacted>").finish(),
            Self::Session { email } => f.debug_struct("Session").field("email", email).finish(),
        }
    }
}

/// Credentials injected from configuration.  An API key takes precedence
/// over email and password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct N8nCredentials {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl N8nCredentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            api_key: None,
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// `true` when either scheme can be attempted.
    pub fn is_usable(&self) -> bool {
        non_blank(&self.api_key).is_some()
            || (non_blank(&self.email).is_some() && non_blank(&self.password).is_some())
    }

    pub(crate) fn usable_api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    pub(crate) fn usable_login(&self) -> Option<(&str, &str)> {
        non_blank(&self.email).zip(non_blank(&self.password))
    }
}

impl fmt::Debug for N8nCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("N8nCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
