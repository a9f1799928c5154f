//! The authenticated session handle.
//!
//! A [`Session`] is what integrators hold after a successful authorization:
//! it hands out the read-only [`AuthContext`] for API calls and owns the
//! sign-out operation.

use crate::auth::context::AuthContext;
use crate::auth::store::StoreError;
use crate::auth::token_cache::{SignedOutError, TokenCache};
use crate::auth::AuthToken;
use crate::config::AccessKey;

/// Handle to the current authenticated session.
///
/// The session wraps the token cache: API call sites take the narrowed
/// [`AuthContext`] from [`context`](Self::context), and
/// [`sign_out`](Self::sign_out) is the one place the signed-in state is
/// torn down. Dropping a `Session` does *not* sign out — the cached token
/// remains current for other holders.
///
/// # Example
///
/// ```rust,ignore
/// let session = authorizer.session();
/// let photos = PhotoClient::new(&config, session.context());
///
/// // later
/// session.sign_out().await?;
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    cache: TokenCache,
}

impl Session {
    pub(crate) const fn new(cache: TokenCache) -> Self {
        Self { cache }
    }

    /// Returns the access key this session is scoped to.
    #[must_use]
    pub const fn access_key(&self) -> &AccessKey {
        self.cache.access_key()
    }

    /// Returns `true` iff a token is current.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.cache.has_token()
    }

    /// Returns the current token.
    ///
    /// # Errors
    ///
    /// Returns [`SignedOutError`] if the session has been signed out (or
    /// authorization never completed).
    pub fn token(&self) -> Result<AuthToken, SignedOutError> {
        self.cache.token()
    }

    /// Returns the read-only context for authenticated API calls.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        self.cache.context()
    }

    /// Signs out: clears the token cache and asks storage to forget the
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage backend fails; the in-memory
    /// state is left unchanged in that case.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.cache.clear().await
    }
}
