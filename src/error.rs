//! Error types for the Lightbox API client.
//!
//! This module contains error types used throughout the crate for
//! configuration and validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use lightbox_api::{AccessKey, ConfigError};
//!
//! let result = AccessKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessKey)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Access key cannot be empty.
    #[error("Access key cannot be empty. Please provide a valid Lightbox access key.")]
    EmptyAccessKey,

    /// Secret key cannot be empty.
    #[error("Secret key cannot be empty. Please provide a valid Lightbox secret key.")]
    EmptySecretKey,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://api.lightbox.photos/v1').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A scope string is invalid.
    #[error("Invalid scope: {reason}")]
    InvalidScope {
        /// The reason the scope is invalid.
        reason: String,
    },

    /// A scope subtraction would produce an empty set.
    ///
    /// Removing flags from a scope set must leave at least one flag; a
    /// request with no scope is represented explicitly by
    /// [`AuthScope::none`](crate::AuthScope::none), never by subtraction.
    #[error("Subtracting '{removed}' from '{from}' would leave no scope flags")]
    EmptyScopeResult {
        /// The scope set being subtracted from.
        from: String,
        /// The flags being removed.
        removed: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
