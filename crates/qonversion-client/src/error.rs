//! Client error types.

use reqwest::Method;

/// Errors that can occur when using the Qonversion client.
///
/// Request errors carry the HTTP method and path of the call that failed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connection, DNS, TLS, timeout).
    #[error("{method} {path}: transport error: {source}")]
    Transport {
        /// HTTP method of the failed request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("{method} {path}: API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP method of the failed request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if one could be read.
        message: Option<String>,
        /// Raw response body.
        body: String,
    },

    /// A 2xx response body did not match the expected shape.
    #[error("{method} {path}: unexpected response body: {source}")]
    Decode {
        /// HTTP method of the request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A path id that URL parsing would resolve away (`.` or `..`).
    ///
    /// Nothing is sent.
    #[error("{method}: invalid path segment {segment:?}")]
    InvalidPathSegment {
        /// HTTP method of the rejected request.
        method: Method,
        /// The rejected id.
        segment: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error message returned by the API.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether no response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }

    /// Whether the API answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = ClientError::Api {
            method: Method::GET,
            path: "/users/missing".into(),
            status: 404,
            message: Some("not found".into()),
            body: r#"{"message":"not found"}"#.into(),
        };
        assert_eq!(err.to_string(), "GET /users/missing: API error 404: not found");
        assert!(err.is_not_found());
        assert!(!err.is_transport());
        assert_eq!(err.remote_message(), Some("not found"));
    }

    #[test]
    fn api_error_without_message() {
        let err = ClientError::Api {
            method: Method::DELETE,
            path: "/users/u/entitlements/e".into(),
            status: 502,
            message: None,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "DELETE /users/u/entitlements/e: API error 502: no message"
        );
        assert_eq!(err.status(), Some(502));
    }
}
