//! Access token types for the Lightbox API.
//!
//! This module provides the [`AuthToken`] type produced by a successful
//! token exchange.

use crate::auth::AuthScope;
use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access token issued by the Lightbox token endpoint.
///
/// `AuthToken` is an immutable value: it is produced only by a successful
/// token exchange and is never mutated afterwards. The wire format matches
/// the provider's token response:
///
/// ```json
/// {
///   "access_token": "at-123",
///   "token_type": "bearer",
///   "refresh_token": "rt-456",
///   "scope": "read_photos",
///   "created_at": 1700000000
/// }
/// ```
///
/// `created_at` travels as Unix seconds and is exposed as a UTC timestamp.
///
/// # Thread Safety
///
/// `AuthToken` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use lightbox_api::AuthToken;
///
/// let token: AuthToken = serde_json::from_str(
///     r#"{"access_token":"at-123","token_type":"bearer",
///         "refresh_token":"rt-456","scope":"read_photos",
///         "created_at":1700000000}"#,
/// ).unwrap();
///
/// assert_eq!(token.access_token, "at-123");
/// assert_eq!(token.token_type, "bearer");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// The bearer token used to authenticate API calls.
    pub access_token: String,

    /// The token type reported by the provider (always `bearer` today).
    pub token_type: String,

    /// The refresh token, when the provider issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// The scope granted to this token.
    #[serde(default)]
    pub scope: Option<AuthScope>,

    /// When the provider created the token (Unix seconds on the wire).
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Verify AuthToken is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthToken>();
};
