//! OAuth 2.0-style authorization flow for the Lightbox API.
//!
//! This module implements the authorization flow engine: everything needed
//! to turn a set of API credentials into a cached access token.
//!
//! # Flow anatomy
//!
//! 1. **Code acquisition** — one of two interchangeable strategies:
//!    - *Browser-delegated* (primary): a [`CallbackListener`] binds a local
//!      redirect endpoint, a [`BrowserLauncher`] opens the provider's
//!      authorize URL, and the one-time code arrives with the redirect.
//!    - *Scripted login* (alternate): [`CredentialFlow`] scrapes the
//!      provider's authorize/login/confirm HTML pages, surfacing the login
//!      form to the integrator through a [`LoginFormController`].
//! 2. **Token exchange** — the code is traded for an
//!    [`AuthToken`](crate::auth::AuthToken) at the provider's token
//!    endpoint.
//! 3. **Caching** — the token lands atomically in the
//!    [`TokenCache`](crate::auth::TokenCache), and the
//!    [`Session`](crate::auth::Session) built on it serves API callers.
//!
//! The [`Authorizer`] composes all of the above and reports completion
//! through callbacks; see its module docs for the execution model.
//!
//! # Example: browser-delegated authorization
//!
//! ```rust,ignore
//! use lightbox_api::auth::oauth::{AcquireVia, Authorizer, SystemBrowser};
//! use lightbox_api::auth::MemoryTokenStore;
//! use lightbox_api::{AccessKey, LightboxConfig, SecretKey};
//! use std::sync::Arc;
//!
//! let config = LightboxConfig::builder()
//!     .access_key(AccessKey::new("consumer-key")?)
//!     .build()?;
//!
//! let authorizer = Authorizer::new(config, Arc::new(MemoryTokenStore::default())).await?;
//!
//! let handle = authorizer.authorize(
//!     SecretKey::new("consumer-secret")?,
//!     "read_photos+write_photos".parse()?,
//!     AcquireVia::Browser(Arc::new(SystemBrowser)),
//!     |token| println!("authorized: {}", token.token_type),
//!     |error| eprintln!("failed: {error}"),
//! );
//! handle.finished().await;
//!
//! let session = authorizer.session();
//! println!("signed in: {}", session.is_signed_in());
//! ```
//!
//! # Example: scripted login (headless)
//!
//! ```rust,ignore
//! use lightbox_api::auth::oauth::{AcquireVia, LoginFormController};
//!
//! let controller = Arc::new(LoginFormController::new());
//! controller.attach_listener(my_ui); // asked to render the form on demand
//!
//! let handle = authorizer.authorize(
//!     secret,
//!     scopes,
//!     AcquireVia::ScriptedLogin(Arc::clone(&controller)),
//!     on_success,
//!     on_failure,
//! );
//!
//! // When the UI collects credentials:
//! controller.submit("user@example.com", "password");
//! // Or, if the user walks away:
//! controller.give_up("dialog closed");
//! ```

mod authorizer;
mod browser;
mod callback_listener;
mod code;
mod confirm_form;
mod credential_flow;
mod login_form;
mod page;

pub use authorizer::{AcquireVia, AuthError, AuthorizeHandle, Authorizer};
pub use browser::{BrowserLauncher, SystemBrowser};
pub use callback_listener::{CallbackListener, DEFAULT_START_TIMEOUT};
pub use code::{AuthenticityToken, AuthorizationCode};
pub use confirm_form::{AuthorizeForm, REQUIRED_CONFIRM_FIELDS};
pub use credential_flow::{CredentialFlow, CredentialFlowError};
pub use login_form::{LoginFormController, LoginFormListener, LoginSubmitter};
