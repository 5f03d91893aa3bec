//! API error types.

use thiserror::Error;

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("request failed with HTTP {status}: {message}")]
    Status {
        /// HTTP method of the request.
        method: String,
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the canonical reason.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured endpoint cannot be used as a base URL.
    #[error("invalid endpoint {0:?}")]
    InvalidEndpoint(String),
}

impl ApiError {
    /// Create a status error without a live response, e.g. in fakes.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Status {
            method: String::new(),
            path: String::new(),
            status,
            body: message.clone(),
            message,
        }
    }

    /// The HTTP status code, if the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidEndpoint(_) => None,
        }
    }

    /// Whether the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Whether the API rejected the call because the service is not enabled
    /// for the project.
    #[must_use]
    pub fn is_service_disabled(&self) -> bool {
        match self {
            Self::Status { status, body, .. } => {
                *status == 403 && body.to_ascii_lowercase().contains("not enabled")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected() {
        assert!(ApiError::http(404, "instance not found").is_not_found());
        assert!(!ApiError::http(500, "boom").is_not_found());
    }

    #[test]
    fn service_disabled_requires_forbidden_status() {
        assert!(ApiError::http(403, "Service is not enabled for project").is_service_disabled());
        assert!(!ApiError::http(403, "forbidden").is_service_disabled());
        assert!(!ApiError::http(400, "service not enabled").is_service_disabled());
    }

    #[test]
    fn display_includes_status() {
        let err = ApiError::Status {
            method: "DELETE".into(),
            path: "/v1beta1/projects/p/regions/eu01/instances/abcd".into(),
            status: 409,
            message: "conflict".into(),
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with HTTP 409: conflict"
        );
    }
}
