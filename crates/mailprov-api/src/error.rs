//! Error types for provisioning API operations.

/// Result type alias for provisioning API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Provisioning API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status.
    #[error("Provisioning API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body returned by the service.
        message: String,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Creates an API error from a status code and response body.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the service reported that the mailbox already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Returns true if this is a server-side error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|code| (500..600).contains(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status() {
        let err = Error::api(409, "exists");
        assert_eq!(err.status(), Some(409));
        assert!(err.is_conflict());
        assert!(!err.is_server_error());
    }

    #[test]
    fn server_error_detection() {
        assert!(Error::api(503, "unavailable").is_server_error());
        assert!(!Error::api(404, "missing").is_server_error());
    }

    #[test]
    fn config_error_has_no_status() {
        let err = Error::InvalidConfig("missing base url".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Invalid configuration: missing base url");
    }
}
