//! Error type definitions for the profile proxy

use thiserror::Error;

/// Top-level application error type
///
/// Every failure a handler can observe ends up here. The web layer decides
/// the status code and how much of the detail is shown to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Upstream is unreachable or refusing us for now
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised by the Instagram collaborator
///
/// These are the only outcomes the rest of the service has to understand;
/// everything the remote side can do is folded into one of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The requested profile does not exist
    #[error("Profile {username} does not exist")]
    ProfileNotFound { username: String },

    /// Network failure, throttling or upstream outage
    #[error("Connection to Instagram failed: {message}")]
    Connection { message: String },

    /// Credentials rejected or a login challenge was raised
    #[error("Login failed for {username}: {message}")]
    LoginFailed { username: String, message: String },

    /// No password could be found for an account that needs to log in
    #[error("No password available for {username} (set {env_var})")]
    MissingCredentials { username: String, env_var: String },

    /// Anything the client could not make sense of
    #[error("Unexpected upstream response: {message}")]
    Unexpected { message: String },
}

impl From<UpstreamError> for AppError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::ProfileNotFound { username } => AppError::not_found("Profile", username),
            UpstreamError::Connection { message } => AppError::UpstreamUnavailable { message },
            other => AppError::internal(other.to_string()),
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl UpstreamError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a login failed error
    pub fn login_failed<U: Into<String>, M: Into<String>>(username: U, message: M) -> Self {
        Self::LoginFailed {
            username: username.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::unexpected(error.to_string())
        } else {
            Self::connection(error.to_string())
        }
    }
}
