//! Read-only authentication context for API callers.

use crate::auth::token_cache::{SignedOutError, TokenCell};
use crate::auth::AuthToken;
use crate::config::AccessKey;
use std::sync::PoisonError;

/// A read-only view of the authentication state.
///
/// `AuthContext` is the capability handed to API call sites: it exposes the
/// access key and the current token, and nothing else. It shares state with
/// the [`TokenCache`](crate::auth::TokenCache) it was narrowed from, so it
/// always reflects the cache's current LoggedIn/LoggedOut state, but it
/// cannot reset or clear the cache — the conversion only goes from mutable
/// to read-only, never back.
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
/// let context = cache.context();
/// assert_eq!(context.access_key().as_ref(), "key");
/// assert!(context.token().is_err()); // signed out
/// # });
/// ```
#[derive(Clone)]
pub struct AuthContext {
    access_key: AccessKey,
    state: TokenCell,
}

impl AuthContext {
    pub(crate) fn new(access_key: AccessKey, state: TokenCell) -> Self {
        Self { access_key, state }
    }

    /// Returns the access key.
    #[must_use]
    pub const fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    /// Returns the current token.
    ///
    /// # Errors
    ///
    /// Returns [`SignedOutError`] if no session is current.
    pub fn token(&self) -> Result<AuthToken, SignedOutError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SignedOutError)
    }

    /// Returns `true` iff a session is current.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("access_key", &self.access_key)
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}

// Verify AuthContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthContext>();
};

#[cfg(test)]
mod tests {
    use crate::auth::{MemoryTokenStore, TokenCache};
    use crate::config::AccessKey;
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_context_is_read_only_view_of_cache() {
        let cache = TokenCache::new(
            AccessKey::new("key").unwrap(),
            Arc::new(MemoryTokenStore::default()),
        )
        .await
        .unwrap();
        let context = cache.context();

        assert!(!context.is_signed_in());

        cache
            .reset(crate::AuthToken {
                access_token: "at-1".to_string(),
                token_type: "bearer".to_string(),
                refresh_token: None,
                scope: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(context.is_signed_in());
        assert_eq!(context.token().unwrap().access_token, "at-1");

        cache.clear().await.unwrap();
        assert!(context.token().is_err());
    }

    #[tokio::test]
    async fn test_debug_does_not_require_token() {
        let cache = TokenCache::new(
            AccessKey::new("key").unwrap(),
            Arc::new(MemoryTokenStore::default()),
        )
        .await
        .unwrap();
        let context = cache.context();
        let output = format!("{context:?}");
        assert!(output.contains("signed_in: false"));
    }
}
