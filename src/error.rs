//! Remote call errors
//!
//! Every call made against a remote API (AWS or the content API) fails with a
//! [`RemoteError`]. Callers branch on [`RemoteError::kind`] rather than on the
//! error text.

use crate::aws::auth::AuthError;

/// Coarse classification of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed resource does not exist. Expected and recoverable.
    NotFound,
    /// The remote answered with a domain error of its own.
    Upstream,
    /// Transport failures, throttling, permission problems, bad responses.
    Other,
}

#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("{operation}: resource not found ({message})")]
    NotFound { operation: String, message: String },
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("{operation} failed with status {status} [{code}]: {message}")]
    Api {
        operation: String,
        status: u16,
        code: String,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid response from {operation}: {message}")]
    InvalidResponse { operation: String, message: String },
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::NotFound { .. } => ErrorKind::NotFound,
            RemoteError::Upstream(_) => ErrorKind::Upstream,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn not_found(operation: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::NotFound {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::InvalidResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            RemoteError::not_found("GetPolicy", "no policy").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RemoteError::Upstream("The access token you sent could not be found".into()).kind(),
            ErrorKind::Upstream
        );
        let throttled = RemoteError::Api {
            operation: "CreateResource".into(),
            status: 429,
            code: "TooManyRequestsException".into(),
            message: "Too Many Requests".into(),
        };
        assert_eq!(throttled.kind(), ErrorKind::Other);
        assert!(!throttled.is_not_found());
    }
}
