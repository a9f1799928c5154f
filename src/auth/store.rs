//! Token storage capability.
//!
//! The authorizer persists the current token through an injected
//! [`TokenStore`] so a signed-in state can survive process restarts.
//! Persistence itself is out of scope for this crate: integrators supply
//! their own backend (keychain, file, database), and [`MemoryTokenStore`]
//! is the in-process default.

use crate::auth::AuthToken;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors reported by a token storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to save, load, or clear the token.
    #[error("token storage backend failed: {reason}")]
    Backend {
        /// Backend-supplied description of the failure.
        reason: String,
    },
}

/// An injected storage capability for the current access token.
///
/// Implementations must be safe to call from concurrent tasks. Errors are
/// surfaced to the caller of `reset`/`clear`; the in-memory cache state is
/// only committed after the backend call succeeds.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists the token as the current one.
    async fn save(&self, token: &AuthToken) -> Result<(), StoreError>;

    /// Loads the previously persisted token, if any.
    async fn load(&self) -> Result<Option<AuthToken>, StoreError>;

    /// Forgets the persisted token.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// An in-process [`TokenStore`] backed by a mutex-guarded slot.
///
/// Suitable for tests and short-lived tools that do not need the signed-in
/// state to outlive the process.
///
/// # Example
///
/// ```rust
/// use lightbox_api::auth::{MemoryTokenStore, TokenStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryTokenStore::default();
/// assert!(store.load().await.unwrap().is_none());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    /// Creates a store pre-seeded with a token, as if one had been
    /// persisted by an earlier session.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<AuthToken>, StoreError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn token(value: &str) -> AuthToken {
        AuthToken {
            access_token: value.to_string(),
            token_type: "bearer".to_string(),
            refresh_token: None,
            scope: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryTokenStore::default();
        store.save(&token("at-1")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at-1");
    }

    #[tokio::test]
    async fn test_clear_forgets_token() {
        let store = MemoryTokenStore::with_token(token("at-1"));
        assert!(store.load().await.unwrap().is_some());

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_token() {
        let store = MemoryTokenStore::with_token(token("at-old"));
        store.save(&token("at-new")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at-new");
    }
}
