//! # Lightbox API Rust Client
//!
//! A Rust client for the Lightbox photo-service API, providing type-safe
//! configuration, a full OAuth-style authorization flow, secure in-memory
//! token caching, and an authenticated HTTP client.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`LightboxConfig`] and [`LightboxConfigBuilder`]
//! - Validated newtypes for API credentials, with wipeable secret storage
//! - Composable permission scopes via [`AuthScope`]
//! - Browser-delegated authorization with a local callback listener
//! - Scripted (headless) login driving the provider's HTML pages
//! - Thread-safe token caching with pluggable persistence
//! - An async HTTP client with rate-limit and pagination header handling
//! - An image-resize query DSL via [`media::ResizeSpec`]
//!
//! ## Quick Start
//!
//! ```rust
//! use lightbox_api::{AccessKey, LightboxConfig};
//!
//! // Create configuration using the builder pattern
//! let config = LightboxConfig::builder()
//!     .access_key(AccessKey::new("your-access-key").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Authorization
//!
//! Authorization turns your API credentials into a cached access token.
//! The entry call is non-blocking: the flow runs on a background task and
//! reports through callbacks.
//!
//! ```rust,ignore
//! use lightbox_api::auth::oauth::{AcquireVia, Authorizer, SystemBrowser};
//! use lightbox_api::auth::MemoryTokenStore;
//! use lightbox_api::{AccessKey, LightboxConfig, SecretKey};
//! use std::sync::Arc;
//!
//! let config = LightboxConfig::builder()
//!     .access_key(AccessKey::new("your-access-key")?)
//!     .build()?;
//!
//! let authorizer = Authorizer::new(config, Arc::new(MemoryTokenStore::default())).await?;
//!
//! let handle = authorizer.authorize(
//!     SecretKey::new("your-secret-key")?,
//!     "read_photos+write_photos".parse()?,
//!     AcquireVia::Browser(Arc::new(SystemBrowser)),
//!     |token| println!("authorized as {}", token.token_type),
//!     |error| eprintln!("authorization failed: {error}"),
//! );
//! handle.finished().await;
//! ```
//!
//! Headless hosts script the provider's login pages instead, surfacing
//! the login form through a [`auth::oauth::LoginFormController`]; see the
//! [`auth::oauth`] module docs for the full walkthrough.
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use lightbox_api::clients::HttpClient;
//!
//! let session = authorizer.session();
//! let client = HttpClient::new(&config, session.context());
//!
//! let response = client.get("photos", &[("feature", "fresh")]).await?;
//! for photo in response.tree().at("photos").iter() {
//!     println!("{:?}", photo.at("name").str());
//! }
//!
//! // Sign out when done; the cached token is cleared atomically.
//! session.sign_out().await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and session state are
//!   instance-based and passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Outcomes, not exceptions**: flow operations return results; the
//!   orchestrator surfaces exactly one terminal success or failure
//! - **Secrets are wiped**: secret-key buffers are zeroed on every exit
//!   path, including cancellation
//! - **Thread-safe**: shared state is linearized through a single mutex;
//!   all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod media;

// Re-export public types at crate root for convenience
pub use auth::{AuthContext, AuthScope, AuthToken, Session, SignedOutError};
pub use config::{AccessKey, BaseUrl, LightboxConfig, LightboxConfigBuilder, SecretKey};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{HttpClient, HttpError, HttpResponse, JsonTree, PageInfo, RateLimit};

// Re-export authorization flow types for convenience
pub use auth::oauth::{
    AcquireVia, AuthError, AuthorizeHandle, Authorizer, BrowserLauncher, CallbackListener,
    CredentialFlow, CredentialFlowError, LoginFormController, SystemBrowser,
};
