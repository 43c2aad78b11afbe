/// Unified error types for the handles server
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the handles server
#[derive(Error, Debug)]
pub enum HandlesError {
    /// The request hostname cannot be read as `username.domain`
    #[error("Handle could not be parsed from hostname {0}")]
    InvalidHostname(String),

    /// The provider has no authority over the handle's domain
    #[error("Decentralized IDs for the domain {0} are not provided by this server.")]
    DomainNotServed(String),

    /// The domain is served but the handle has no DID mapping
    #[error("No DID found for {0}")]
    DidNotFound(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HandlesError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            HandlesError::InvalidHostname(_) | HandlesError::DomainNotServed(_) => {
                StatusCode::BAD_REQUEST
            }
            HandlesError::DidNotFound(_) => StatusCode::NOT_FOUND,
            HandlesError::Database(_) => StatusCode::BAD_GATEWAY,
            HandlesError::Config(_) | HandlesError::Internal(_) | HandlesError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert HandlesError to a plain text HTTP response
impl IntoResponse for HandlesError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            HandlesError::InvalidHostname(_)
            | HandlesError::DomainNotServed(_)
            | HandlesError::DidNotFound(_) => self.to_string(),
            HandlesError::Database(ref e) => {
                tracing::error!(error = %e, "did_provider_unavailable");
                "Decentralized IDs cannot be provided right now.".to_string() // Don't leak details
            }
            _ => {
                tracing::error!(error = %self, "internal_error");
                "Internal server error".to_string()
            }
        };

        (status, message).into_response()
    }
}

/// Result type alias for handles server operations
pub type HandlesResult<T> = Result<T, HandlesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_requests() {
        assert_eq!(
            HandlesError::InvalidHostname("alice".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlesError::DomainNotServed("example.org".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_is_distinct_from_domain_errors() {
        assert_eq!(
            HandlesError::DidNotFound("alice.example.com".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_database_errors_are_gateway_errors() {
        let err = HandlesError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_domain_message_names_the_domain() {
        let err = HandlesError::DomainNotServed("example.org".to_string());
        assert_eq!(
            err.to_string(),
            "Decentralized IDs for the domain example.org are not provided by this server."
        );
    }
}
