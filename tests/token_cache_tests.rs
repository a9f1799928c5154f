//! Integration tests for the token cache.
//!
//! These tests exercise the cache's concurrency contract: transitions are
//! atomic under concurrent readers and writers, and a signed-out cache
//! fails token access with a distinguished error.

use chrono::Utc;
use lightbox_api::auth::{MemoryTokenStore, TokenCache, TokenStore};
use lightbox_api::{AccessKey, AuthToken, SignedOutError};
use std::sync::Arc;

fn token(value: &str) -> AuthToken {
    AuthToken {
        access_token: value.to_string(),
        token_type: "bearer".to_string(),
        refresh_token: None,
        scope: None,
        created_at: Utc::now(),
    }
}

async fn fresh_cache() -> TokenCache {
    TokenCache::new(
        AccessKey::new("key").unwrap(),
        Arc::new(MemoryTokenStore::default()),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn signed_out_error_iff_cleared_or_never_loaded() {
    let cache = fresh_cache().await;

    // Never loaded: token access is an error.
    assert_eq!(cache.token(), Err(SignedOutError));

    // After reset: token access succeeds.
    cache.reset(token("at-1")).await.unwrap();
    assert_eq!(cache.token().unwrap().access_token, "at-1");

    // After clear: back to the error.
    cache.clear().await.unwrap();
    assert_eq!(cache.token(), Err(SignedOutError));
}

#[tokio::test]
async fn readers_never_observe_partial_state() {
    // While writers alternate reset/clear, every concurrent read must see
    // either a complete token or a signed-out error — a token value the
    // writers never wrote would mean a torn read.
    let cache = fresh_cache().await;

    let writer = {
        let cache = cache.clone();
        tokio::spawn(async move {
            for round in 0..200u32 {
                cache.reset(token(&format!("at-{round}"))).await.unwrap();
                cache.clear().await.unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    match cache.token() {
                        Ok(token) => {
                            assert!(token.access_token.starts_with("at-"));
                            assert_eq!(token.token_type, "bearer");
                        }
                        Err(SignedOutError) => {}
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn final_state_matches_last_operation() {
    // Whatever interleaving the scheduler picks, after all writers join
    // the cache must agree with its own storage backend and hold one of
    // the values actually written.
    let store = Arc::new(MemoryTokenStore::default());
    let cache = TokenCache::new(AccessKey::new("key").unwrap(), Arc::clone(&store) as _)
        .await
        .unwrap();

    let writers: Vec<_> = (0..8u32)
        .map(|id| {
            let cache = cache.clone();
            tokio::spawn(async move {
                if id % 2 == 0 {
                    cache.reset(token(&format!("at-{id}"))).await.unwrap();
                } else {
                    cache.clear().await.unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }

    match cache.token() {
        Ok(current) => {
            assert!(current.access_token.starts_with("at-"));
        }
        Err(SignedOutError) => {}
    }
    // A sequential operation after the storm behaves normally.
    cache.reset(token("at-final")).await.unwrap();
    assert_eq!(cache.token().unwrap().access_token, "at-final");
    assert_eq!(
        store.load().await.unwrap().unwrap().access_token,
        "at-final"
    );
}

#[tokio::test]
async fn context_narrowing_shares_state_with_many_readers() {
    let cache = fresh_cache().await;
    cache.reset(token("at-1")).await.unwrap();

    let contexts: Vec<_> = (0..16).map(|_| cache.context()).collect();
    for context in &contexts {
        assert_eq!(context.token().unwrap().access_token, "at-1");
    }

    cache.clear().await.unwrap();
    for context in &contexts {
        assert!(context.token().is_err());
    }
}

#[tokio::test]
async fn prior_stored_token_starts_logged_in() {
    let store = Arc::new(MemoryTokenStore::with_token(token("at-stored")));
    let cache = TokenCache::new(AccessKey::new("key").unwrap(), store)
        .await
        .unwrap();

    assert!(cache.has_token());
    assert_eq!(cache.token().unwrap().access_token, "at-stored");
}
