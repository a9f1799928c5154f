//! The mutable, thread-safe cache for the current access token.
//!
//! This module provides [`TokenCache`], the single resource shared across
//! concurrent API callers, and [`SignedOutError`], returned when a token is
//! requested while signed out.

use crate::auth::context::AuthContext;
use crate::auth::store::{StoreError, TokenStore};
use crate::auth::AuthToken;
use crate::config::AccessKey;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// The shared LoggedIn/LoggedOut cell.
///
/// `Some(token)` is LoggedIn, `None` is LoggedOut. Every read and write
/// goes through the one mutex, so no caller can observe a half-applied
/// transition.
pub(crate) type TokenCell = Arc<Mutex<Option<AuthToken>>>;

/// The token was requested while no session is current.
///
/// Absence of a token is an error, not an empty optional: API callers are
/// expected to hold a signed-in session, and a missing token means the
/// application skipped authorization or already signed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("signed out: no current access token (authorize before calling the API)")]
pub struct SignedOutError;

/// Thread-safe cache for the current access token.
///
/// The cache has exactly two states — LoggedIn (holding one token) and
/// LoggedOut — and transitions between them atomically. [`reset`](Self::reset)
/// and [`clear`](Self::clear) persist through the injected [`TokenStore`]
/// *before* committing the in-memory transition, so the cache never reports
/// LoggedIn for a token the backend refused to save, and the mutex is never
/// held across an await.
///
/// The mutable cache stays inside the authorizer; API callers receive the
/// read-only [`AuthContext`] narrowing via [`context`](Self::context).
///
/// # Concurrency
///
/// All reads and writes of the state go through a single mutex with no
/// nested acquisition. `TokenCache` is `Clone`; clones share the same state
/// and storage backend.
///
/// # Example
///
/// ```rust
/// use lightbox_api::auth::{MemoryTokenStore, TokenCache};
/// use lightbox_api::AccessKey;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let cache = TokenCache::new(
///     AccessKey::new("key").unwrap(),
///     Arc::new(MemoryTokenStore::default()),
/// )
/// .await
/// .unwrap();
///
/// assert!(!cache.has_token());
/// assert!(cache.token().is_err());
/// # });
/// ```
#[derive(Clone)]
pub struct TokenCache {
    access_key: AccessKey,
    store: Arc<dyn TokenStore>,
    state: TokenCell,
}

impl TokenCache {
    /// Creates the cache, loading any previously persisted token.
    ///
    /// If the storage capability yields a prior token the cache starts
    /// LoggedIn; otherwise it starts LoggedOut.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails to load.
    pub async fn new(
        access_key: AccessKey,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, StoreError> {
        let prior = store.load().await?;
        if prior.is_some() {
            tracing::debug!("token cache starting logged in from stored token");
        }
        Ok(Self {
            access_key,
            store,
            state: Arc::new(Mutex::new(prior)),
        })
    }

    /// Returns the access key this cache is scoped to.
    #[must_use]
    pub const fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    /// Returns `true` iff the state is LoggedIn.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.lock_state().is_some()
    }

    /// Returns the current token.
    ///
    /// # Errors
    ///
    /// Returns [`SignedOutError`] if the state is LoggedOut.
    pub fn token(&self) -> Result<AuthToken, SignedOutError> {
        self.lock_state().clone().ok_or(SignedOutError)
    }

    /// Transitions to LoggedIn with the given token.
    ///
    /// The token is persisted first; the in-memory transition commits only
    /// after the backend accepts it, and is atomic with respect to
    /// concurrent readers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisting fails; the state is unchanged.
    pub async fn reset(&self, token: AuthToken) -> Result<(), StoreError> {
        self.store.save(&token).await?;
        *self.lock_state() = Some(token);
        tracing::debug!("token cache reset: logged in");
        Ok(())
    }

    /// Transitions to LoggedOut and asks storage to forget the token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails to clear; the state is
    /// unchanged.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.clear().await?;
        *self.lock_state() = None;
        tracing::debug!("token cache cleared: logged out");
        Ok(())
    }

    /// Returns the read-only capability view of this cache.
    ///
    /// The context shares this cache's state cell, so it always observes
    /// the current token, but it exposes no way to mutate the cache. The
    /// conversion only narrows; there is no way back from an
    /// [`AuthContext`] to the mutable cache.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        AuthContext::new(self.access_key.clone(), Arc::clone(&self.state))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<AuthToken>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("access_key", &self.access_key)
            .field("logged_in", &self.has_token())
            .finish_non_exhaustive()
    }
}

// Verify TokenCache is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenCache>();
    assert_send_sync::<SignedOutError>();
};
