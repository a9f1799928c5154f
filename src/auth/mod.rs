//! Authentication types for the Lightbox API client.
//!
//! This module provides the types for holding and caching authentication
//! state, and the [`oauth`] submodule implementing the authorization flow
//! itself.
//!
//! # Overview
//!
//! - [`AuthScope`]: a composable set of permission flags with a
//!   deterministic `+`-joined encoding
//! - [`AuthToken`]: the immutable access token produced by a token exchange
//! - [`TokenCache`]: the thread-safe LoggedIn/LoggedOut state shared by
//!   concurrent API callers
//! - [`AuthContext`]: the read-only capability API call sites receive
//! - [`Session`]: the integrator-facing handle exposing `sign_out()`
//! - [`TokenStore`] / [`MemoryTokenStore`]: the injected persistence
//!   capability and its in-process default
//! - [`oauth`]: code acquisition, token exchange, and orchestration
//!
//! # State model
//!
//! At most one token is current at a time. The cache transitions between
//! LoggedIn and LoggedOut atomically: every read and write goes through a
//! single mutex, so concurrent callers never observe a half-applied
//! transition. Requesting a token while LoggedOut is an error
//! ([`SignedOutError`]), not an empty optional — API callers are expected
//! to hold a current session.
//!
//! # Example
//!
//! ```rust
//! use lightbox_api::auth::{MemoryTokenStore, TokenCache};
//! use lightbox_api::AccessKey;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let cache = TokenCache::new(
//!     AccessKey::new("key").unwrap(),
//!     Arc::new(MemoryTokenStore::default()),
//! )
//! .await
//! .unwrap();
//!
//! // Fresh store, so the cache starts logged out.
//! assert!(!cache.has_token());
//! # });
//! ```

mod context;
pub mod oauth;
mod scopes;
mod session;
mod store;
mod token;
mod token_cache;

pub use context::AuthContext;
pub use scopes::AuthScope;
pub use session::Session;
pub use store::{MemoryTokenStore, StoreError, TokenStore};
pub use token::AuthToken;
pub use token_cache::{SignedOutError, TokenCache};
