//! Unified API error handling
//!
//! Classifies every failure a request can produce so callers can react
//! consistently (retry, redirect to login, surface a message).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// 401 that survived the refresh-and-retry cycle.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The refresh-token exchange itself failed. Session state has been
    /// cleared; the caller must send the user back to login.
    #[error("session expired")]
    SessionExpired,

    /// 4xx other than 401, with the backend-provided detail text.
    #[error("validation error ({status}): {message}")]
    Validation { status: u16, message: String },

    /// 5xx from the backend.
    #[error("server error ({status})")]
    Server { status: u16 },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status the error was derived from, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Validation { status, .. } | Self::Server { status } => Some(*status),
            Self::Network(_) | Self::SessionExpired | Self::Internal(_) => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the user.
    pub fn public_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server".to_string(),
            Self::Unauthorized(msg) => msg.clone(),
            Self::SessionExpired => "Your session has expired, please log in again".to_string(),
            Self::Validation { message, .. } => message.clone(),
            // Don't leak internal error details
            Self::Server { .. } => "The server encountered an error".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// True when the caller should discard the session and show the
    /// login entry point.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_follow_variant() {
        let err = ApiError::Validation {
            status: 422,
            message: "title required".into(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.public_message(), "title required");

        let err = ApiError::Server { status: 503 };
        assert_eq!(err.status(), Some(503));
        assert!(!err.requires_login());

        assert!(ApiError::SessionExpired.requires_login());
        assert_eq!(ApiError::SessionExpired.status(), None);
    }
}
