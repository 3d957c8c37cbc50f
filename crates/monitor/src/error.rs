//! Error types for the monitoring API client.

use thiserror::Error;

/// Errors surfaced by [`crate::MonitorClient`].
///
/// Callers never need to inspect HTTP status codes directly: network
/// failures, timeouts and non-2xx responses all collapse into
/// [`MonitorError::Api`], while exhausted or rejected authentication
/// is always [`MonitorError::Authentication`].
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {message}")]
    Api {
        /// HTTP status, when the failure came from a response.
        status: Option<u16>,
        message: String,
    },
}

impl MonitorError {
    /// Build an [`MonitorError::Api`] without an HTTP status (network
    /// failure, timeout, malformed response).
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Build an [`MonitorError::Api`] carrying the response status.
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = MonitorError::api_status(500, "internal server error");
        assert_eq!(err.to_string(), "API error: internal server error");
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_authentication_error_display() {
        let err = MonitorError::Authentication("no token returned".to_string());
        assert_eq!(err.to_string(), "authentication failed: no token returned");
        assert!(err.is_authentication());
    }

    #[test]
    fn test_api_error_without_status() {
        let err = MonitorError::api("connection error");
        match err {
            MonitorError::Api { status, .. } => assert!(status.is_none()),
            _ => panic!("expected Api error"),
        }
    }
}
