//! Configuration types for the Lightbox API client.
//!
//! This module provides the core configuration types used to initialize
//! and configure the client for API communication with Lightbox.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`LightboxConfig`]: The main configuration struct holding all client settings
//! - [`LightboxConfigBuilder`]: A builder for constructing [`LightboxConfig`] instances
//! - [`AccessKey`]: A validated access key newtype
//! - [`SecretKey`]: A wipeable secret key with masked debug output
//! - [`BaseUrl`]: A validated service base URL
//!
//! # Example
//!
//! ```rust
//! use lightbox_api::{LightboxConfig, AccessKey};
//!
//! let config = LightboxConfig::builder()
//!     .access_key(AccessKey::new("my-access-key").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.callback_port(), 3000);
//! ```

mod newtypes;

pub use newtypes::{AccessKey, BaseUrl, SecretKey};

use crate::error::ConfigError;
use std::time::Duration;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.lightbox.photos/v1";

/// Default host the callback listener binds to.
pub const DEFAULT_CALLBACK_HOST: &str = "localhost";

/// Default port the callback listener binds to.
pub const DEFAULT_CALLBACK_PORT: u16 = 3000;

/// Default time to wait for the callback listener to become ready.
pub const DEFAULT_SERVER_START_TIMEOUT: Duration =
    crate::auth::oauth::DEFAULT_START_TIMEOUT;

/// Configuration for the Lightbox API client.
///
/// This struct holds all configuration needed for client operations:
/// the API access key, service base URL, and the local callback listener
/// settings used during authorization.
///
/// The secret key is deliberately *not* part of the configuration — it is
/// passed per authorization call inside a wipeable [`SecretKey`] buffer and
/// never retained.
///
/// # Thread Safety
///
/// `LightboxConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use lightbox_api::{LightboxConfig, AccessKey, BaseUrl};
///
/// let config = LightboxConfig::builder()
///     .access_key(AccessKey::new("key").unwrap())
///     .base_url(BaseUrl::new("https://staging.lightbox.photos/v1").unwrap())
///     .callback_port(0) // ephemeral port
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct LightboxConfig {
    access_key: AccessKey,
    base_url: BaseUrl,
    callback_host: String,
    callback_port: u16,
    server_start_timeout: Duration,
    user_agent_prefix: Option<String>,
}

impl LightboxConfig {
    /// Creates a new builder for constructing a `LightboxConfig`.
    #[must_use]
    pub fn builder() -> LightboxConfigBuilder {
        LightboxConfigBuilder::new()
    }

    /// Returns the access key.
    #[must_use]
    pub const fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the host the callback listener binds to.
    #[must_use]
    pub fn callback_host(&self) -> &str {
        &self.callback_host
    }

    /// Returns the port the callback listener binds to.
    ///
    /// A value of `0` requests an ephemeral port; the listener reports the
    /// actually bound port through its callback URI.
    #[must_use]
    pub const fn callback_port(&self) -> u16 {
        self.callback_port
    }

    /// Returns the time to wait for the callback listener to become ready.
    #[must_use]
    pub const fn server_start_timeout(&self) -> Duration {
        self.server_start_timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify LightboxConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LightboxConfig>();
};

/// Builder for constructing [`LightboxConfig`] instances.
///
/// The only required field is `access_key`. All other fields have defaults
/// matching the production Lightbox service.
///
/// # Defaults
///
/// - `base_url`: [`DEFAULT_BASE_URL`]
/// - `callback_host`: [`DEFAULT_CALLBACK_HOST`]
/// - `callback_port`: [`DEFAULT_CALLBACK_PORT`]
/// - `server_start_timeout`: [`DEFAULT_SERVER_START_TIMEOUT`]
/// - `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use lightbox_api::{LightboxConfig, AccessKey};
/// use std::time::Duration;
///
/// let config = LightboxConfig::builder()
///     .access_key(AccessKey::new("key").unwrap())
///     .callback_port(8912)
///     .server_start_timeout(Duration::from_secs(5))
///     .user_agent_prefix("MyApp/1.0")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct LightboxConfigBuilder {
    access_key: Option<AccessKey>,
    base_url: Option<BaseUrl>,
    callback_host: Option<String>,
    callback_port: Option<u16>,
    server_start_timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl LightboxConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access key (required).
    #[must_use]
    pub fn access_key(mut self, key: AccessKey) -> Self {
        self.access_key = Some(key);
        self
    }

    /// Sets the service base URL.
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the host the callback listener binds to.
    #[must_use]
    pub fn callback_host(mut self, host: impl Into<String>) -> Self {
        self.callback_host = Some(host.into());
        self
    }

    /// Sets the port the callback listener binds to (`0` = ephemeral).
    #[must_use]
    pub fn callback_port(mut self, port: u16) -> Self {
        self.callback_port = Some(port);
        self
    }

    /// Sets the time to wait for the callback listener to become ready.
    #[must_use]
    pub fn server_start_timeout(mut self, timeout: Duration) -> Self {
        self.server_start_timeout = Some(timeout);
        self
    }

    /// Sets a prefix for the User-Agent header on API requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `access_key` was not
    /// set, or [`ConfigError::InvalidBaseUrl`] if the default base URL fails
    /// validation (which would indicate a packaging bug, not caller error).
    pub fn build(self) -> Result<LightboxConfig, ConfigError> {
        let access_key = self.access_key.ok_or(ConfigError::MissingRequiredField {
            field: "access_key",
        })?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => BaseUrl::new(DEFAULT_BASE_URL)?,
        };

        Ok(LightboxConfig {
            access_key,
            base_url,
            callback_host: self
                .callback_host
                .unwrap_or_else(|| DEFAULT_CALLBACK_HOST.to_string()),
            callback_port: self.callback_port.unwrap_or(DEFAULT_CALLBACK_PORT),
            server_start_timeout: self
                .server_start_timeout
                .unwrap_or(DEFAULT_SERVER_START_TIMEOUT),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
