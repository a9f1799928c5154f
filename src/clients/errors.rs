//! Error types for the HTTP client.

use crate::auth::SignedOutError;
use thiserror::Error;

/// Errors that can occur while making an authenticated API request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The API answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Response {
        /// The HTTP status code.
        status: u16,
        /// The response body, or a description of why it was unusable.
        message: String,
    },

    /// The request was attempted without a current session.
    #[error(transparent)]
    SignedOut(#[from] SignedOutError),

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

// Verify HttpError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_error_includes_status_and_message() {
        let error = HttpError::Response {
            status: 404,
            message: "not found".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn test_signed_out_converts_into_http_error() {
        let error: HttpError = SignedOutError.into();
        assert!(matches!(error, HttpError::SignedOut(_)));
    }
}
