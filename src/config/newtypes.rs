//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated Lightbox access key.
///
/// This newtype ensures the access key is non-empty and provides type safety
/// to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use lightbox_api::AccessKey;
///
/// let key = AccessKey::new("my-access-key").unwrap();
/// assert_eq!(key.as_ref(), "my-access-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKey(String);

impl AccessKey {
    /// Creates a new validated access key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyAccessKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for AccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A Lightbox secret key held in wipeable storage.
///
/// The key lives in a mutable byte buffer that is overwritten with zeros
/// when the value is dropped, so the secret does not linger in memory after
/// an authorization flow finishes — on success, failure, or cancellation
/// alike. An explicit [`wipe`](Self::wipe) is available for callers that
/// want to clear the buffer before the value goes out of scope.
///
/// # Security
///
/// - The `Debug` implementation masks the value, displaying only
///   `SecretKey(*****)`.
/// - `SecretKey` is deliberately not `Clone`: each copy of a secret is
///   another buffer that must be wiped.
///
/// # Example
///
/// ```rust
/// use lightbox_api::SecretKey;
///
/// let mut secret = SecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "SecretKey(*****)");
///
/// secret.wipe();
/// assert!(secret.is_wiped());
/// ```
#[derive(PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Creates a new validated secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptySecretKey);
        }
        Ok(Self(key.into_bytes()))
    }

    /// Returns the secret value.
    ///
    /// The buffer always holds the UTF-8 bytes of the string the key was
    /// constructed from (or zeros after a wipe), so this never fails in
    /// practice; a wiped buffer reads back as NUL characters.
    #[must_use]
    pub fn reveal(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Overwrites the buffer with zeros.
    ///
    /// Called automatically on drop. `black_box` keeps the overwrite from
    /// being optimized away as a dead store.
    pub fn wipe(&mut self) {
        for byte in &mut self.0 {
            *byte = 0;
        }
        std::hint::black_box(&self.0);
    }

    /// Returns `true` if the buffer holds only zeros.
    #[must_use]
    pub fn is_wiped(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(*****)")
    }
}

/// A validated service base URL.
///
/// This newtype validates that the URL carries an `http` or `https` scheme
/// and normalizes away any trailing slash, so endpoint paths can be joined
/// without double separators.
///
/// # Example
///
/// ```rust
/// use lightbox_api::BaseUrl;
///
/// let base = BaseUrl::new("https://api.lightbox.photos/v1/").unwrap();
/// assert_eq!(base.as_ref(), "https://api.lightbox.photos/v1");
/// assert_eq!(base.join("oauth/token"), "https://api.lightbox.photos/v1/oauth/token");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is empty or does
    /// not start with `http://` or `https://`.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();

        if !trimmed.starts_with("https://") && !trimmed.starts_with("http://") {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        // Reject a bare scheme with no host
        let rest = trimmed
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// Joins a path onto the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Verify newtypes are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AccessKey>();
    assert_send_sync::<SecretKey>();
    assert_send_sync::<BaseUrl>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_key_rejects_empty() {
        assert!(matches!(AccessKey::new(""), Err(ConfigError::EmptyAccessKey)));
    }

    #[test]
    fn test_access_key_round_trips() {
        let key = AccessKey::new("consumer-key").unwrap();
        assert_eq!(key.as_ref(), "consumer-key");
    }

    #[test]
    fn test_secret_key_rejects_empty() {
        assert!(matches!(SecretKey::new(""), Err(ConfigError::EmptySecretKey)));
    }

    #[test]
    fn test_secret_key_debug_is_masked() {
        let secret = SecretKey::new("super-secret").unwrap();
        let debug = format!("{secret:?}");
        assert_eq!(debug, "SecretKey(*****)");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_secret_key_wipe_zeroes_buffer() {
        let mut secret = SecretKey::new("super-secret").unwrap();
        assert!(!secret.is_wiped());
        assert_eq!(secret.reveal(), "super-secret");

        secret.wipe();
        assert!(secret.is_wiped());
        assert_ne!(secret.reveal(), "super-secret");
    }

    #[test]
    fn test_base_url_requires_scheme() {
        assert!(BaseUrl::new("api.lightbox.photos").is_err());
        assert!(BaseUrl::new("ftp://api.lightbox.photos").is_err());
        assert!(BaseUrl::new("https://").is_err());
        assert!(BaseUrl::new("https://api.lightbox.photos").is_ok());
        assert!(BaseUrl::new("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let base = BaseUrl::new("https://api.lightbox.photos/v1/").unwrap();
        assert_eq!(base.as_ref(), "https://api.lightbox.photos/v1");
    }

    #[test]
    fn test_base_url_join() {
        let base = BaseUrl::new("https://api.lightbox.photos/v1").unwrap();
        assert_eq!(
            base.join("/oauth/authorize"),
            "https://api.lightbox.photos/v1/oauth/authorize"
        );
        assert_eq!(
            base.join("oauth/token"),
            "https://api.lightbox.photos/v1/oauth/token"
        );
    }
}
