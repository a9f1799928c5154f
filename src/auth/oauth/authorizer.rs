//! The authorization orchestrator.
//!
//! [`Authorizer`] turns a set of API credentials into a usable, cached
//! access token. It composes the whole flow: the cached-token
//! short-circuit, the local [`CallbackListener`], one of two
//! interchangeable code-acquisition strategies, the token exchange, and
//! the atomic handoff into the [`TokenCache`].
//!
//! # Strategies
//!
//! Two strategies coexist behind [`AcquireVia`], selected per call:
//!
//! - [`AcquireVia::Browser`] (primary) delegates to the user's browser:
//!   the authorize URL points its `redirect_uri` at the local listener,
//!   and the flow waits for the one-shot code delivery.
//! - [`AcquireVia::ScriptedLogin`] (alternate, for headless contexts)
//!   scripts the provider's HTML pages through [`CredentialFlow`],
//!   surfacing the login form to the integrator via a
//!   [`LoginFormController`].
//!
//! # Execution model
//!
//! [`Authorizer::authorize`] is non-blocking: the flow runs on a spawned
//! tokio task and reports through exactly one of the two completion
//! callbacks. Waits — the code delivery, the integrator's login
//! submission — are channel awaits; no thread blocks on them.
//!
//! # Example
//!
//! ```rust,ignore
//! let authorizer = Authorizer::new(config, Arc::new(MemoryTokenStore::default())).await?;
//!
//! let handle = authorizer.authorize(
//!     SecretKey::new("consumer-secret")?,
//!     "read_photos".parse()?,
//!     AcquireVia::Browser(Arc::new(SystemBrowser)),
//!     |token| println!("signed in: {}", token.token_type),
//!     |error| eprintln!("authorization failed: {error}"),
//! );
//!
//! // ... the handle can cancel the flow, tearing down the listener.
//! handle.finished().await;
//! ```

use crate::auth::oauth::browser::BrowserLauncher;
use crate::auth::oauth::callback_listener::CallbackListener;
use crate::auth::oauth::code::AuthorizationCode;
use crate::auth::oauth::credential_flow::{CredentialFlow, CredentialFlowError};
use crate::auth::oauth::login_form::{LoginFormController, LoginSubmitter};
use crate::auth::session::Session;
use crate::auth::store::{StoreError, TokenStore};
use crate::auth::token_cache::TokenCache;
use crate::auth::{AuthScope, AuthToken};
use crate::config::{LightboxConfig, SecretKey};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Terminal failures of an authorize flow.
///
/// Flow-continuation outcomes (`NeedsLogin`, `NeedsConfirmAuthorize`,
/// retryable `InvalidCredentials`) never surface here — the orchestrator
/// consumes them internally. Whatever reaches the failure callback is
/// final for that flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The local callback listener did not become ready in time.
    #[error("the local callback listener did not start")]
    ServerStartFailed,

    /// The browser-launch capability could not open a browser.
    ///
    /// Terminal: without a browser no redirect will ever arrive.
    #[error("could not open a browser for authorization: {reason}")]
    BrowserLaunchFailed {
        /// Description from the launch capability.
        reason: String,
    },

    /// The listener closed (stop or cancellation) before a code arrived.
    #[error("the callback listener closed before an authorization code arrived")]
    CodeDeliveryClosed,

    /// The integrator abandoned the login form.
    #[error("login abandoned: {reason}")]
    LoginAbandoned {
        /// Reason supplied to [`LoginFormController::give_up`].
        reason: String,
    },

    /// A terminal failure from the scripted flow or token exchange.
    #[error(transparent)]
    Flow(#[from] CredentialFlowError),

    /// The token storage backend failed while persisting the new token.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// The code-acquisition strategy for one authorize call.
///
/// The two strategies are mutually exclusive alternatives behind one
/// seam, not layers of one another. Browser delegation is the primary
/// path; scripted login exists for headless and server contexts.
#[derive(Clone)]
pub enum AcquireVia {
    /// Delegate to a browser and await the redirect.
    Browser(Arc<dyn BrowserLauncher>),
    /// Script the provider's login pages, surfacing the form through the
    /// given controller.
    ScriptedLogin(Arc<LoginFormController>),
}

impl std::fmt::Debug for AcquireVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browser(_) => f.write_str("AcquireVia::Browser"),
            Self::ScriptedLogin(_) => f.write_str("AcquireVia::ScriptedLogin"),
        }
    }
}

type ListenerSlot = Arc<Mutex<Option<CallbackListener>>>;

/// Handle to an in-flight authorize flow.
///
/// Dropping the handle detaches it; the flow keeps running. Call
/// [`cancel`](Self::cancel) to tear the flow down: the callback listener
/// is stopped first — unblocking a pending code wait and freeing the
/// bound socket — and the task is then aborted. A cancelled flow invokes
/// neither completion callback; the wipeable secret buffer is still
/// zeroed when the task's state is dropped.
#[derive(Debug)]
pub struct AuthorizeHandle {
    task: JoinHandle<()>,
    listener: ListenerSlot,
}

impl AuthorizeHandle {
    /// Cancels the flow and tears down the callback listener.
    pub fn cancel(&self) {
        if let Some(mut listener) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listener.stop_serving();
        }
        self.task.abort();
        tracing::debug!("authorize flow cancelled");
    }

    /// Returns `true` once the flow has completed (or was cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the flow to finish. Completion is still reported through
    /// the callbacks; this only awaits quiescence.
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// Orchestrates authorization against the Lightbox OAuth endpoints.
///
/// Construct one per credential set; it owns the [`TokenCache`] shared by
/// the resulting [`Session`] and every flow it spawns.
#[derive(Clone, Debug)]
pub struct Authorizer {
    config: LightboxConfig,
    cache: TokenCache,
}

impl Authorizer {
    /// Creates an authorizer, loading any previously persisted token into
    /// the cache (a stored token means [`authorize`](Self::authorize)
    /// short-circuits without network activity).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage backend fails to load.
    pub async fn new(
        config: LightboxConfig,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, StoreError> {
        let cache = TokenCache::new(config.access_key().clone(), store).await?;
        Ok(Self { config, cache })
    }

    /// Returns the session handle backed by this authorizer's cache.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.cache.clone())
    }

    /// Starts an authorize flow on a background task.
    ///
    /// The call returns immediately; completion is reported through
    /// exactly one of `on_success` / `on_failure`. The `secret_key`
    /// buffer is wiped when the flow ends, on every path — success,
    /// failure, or cancellation.
    pub fn authorize<S, F>(
        &self,
        secret_key: SecretKey,
        scopes: AuthScope,
        via: AcquireVia,
        on_success: S,
        on_failure: F,
    ) -> AuthorizeHandle
    where
        S: FnOnce(AuthToken) + Send + 'static,
        F: FnOnce(AuthError) + Send + 'static,
    {
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&listener);
        let config = self.config.clone();
        let cache = self.cache.clone();

        let task = tokio::spawn(async move {
            let result = run_flow(&config, &cache, secret_key, &scopes, via, &slot).await;

            // Teardown before reporting: the listener must not outlive
            // the flow that bound it.
            if let Some(mut listener) = slot.lock().unwrap_or_else(PoisonError::into_inner).take()
            {
                listener.stop_serving();
            }

            match result {
                Ok(token) => {
                    tracing::debug!("authorize flow succeeded");
                    on_success(token);
                }
                Err(error) => {
                    tracing::debug!(%error, "authorize flow failed");
                    on_failure(error);
                }
            }
        });

        AuthorizeHandle { task, listener }
    }
}

/// The flow body: cache short-circuit, listener, acquisition, exchange,
/// cache handoff.
///
/// Takes the secret by value; it drops — and therefore wipes — when this
/// function returns, before either completion callback runs.
async fn run_flow(
    config: &LightboxConfig,
    cache: &TokenCache,
    secret_key: SecretKey,
    scopes: &AuthScope,
    via: AcquireVia,
    slot: &ListenerSlot,
) -> Result<AuthToken, AuthError> {
    // 1. A cached token means no network activity at all.
    if let Ok(token) = cache.token() {
        tracing::debug!("authorize short-circuit: token already cached");
        return Ok(token);
    }

    // 2. The listener serves both strategies: the browser path awaits its
    //    redirect, and the scripted path uses its URI as redirect_uri.
    tracing::debug!("authorize flow: starting callback listener");
    let mut listener = CallbackListener::new(config.callback_host(), config.callback_port());
    if !listener.start_serving(config.server_start_timeout()).await {
        return Err(AuthError::ServerStartFailed);
    }
    let redirect_uri = listener.callback_uri();
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);

    let flow = CredentialFlow::new(config);

    // 3. Acquire a one-time code.
    tracing::debug!(strategy = ?via, "authorize flow: acquiring code");
    let code = match via {
        AcquireVia::Browser(launcher) => {
            acquire_via_browser(&flow, launcher.as_ref(), &redirect_uri, scopes, slot).await?
        }
        AcquireVia::ScriptedLogin(form) => {
            acquire_via_scripted_login(&flow, &form, &redirect_uri, scopes).await?
        }
    };

    // 4. Exchange the code; 5. commit the token.
    tracing::debug!("authorize flow: exchanging code");
    let token = flow
        .token(code, config.access_key(), &secret_key, &redirect_uri)
        .await?;
    cache.reset(token.clone()).await?;
    Ok(token)
}

/// Browser-delegated acquisition: launch the authorize URL and await the
/// listener's one-shot delivery.
async fn acquire_via_browser(
    flow: &CredentialFlow,
    launcher: &dyn BrowserLauncher,
    redirect_uri: &str,
    scopes: &AuthScope,
    slot: &ListenerSlot,
) -> Result<AuthorizationCode, AuthError> {
    let (tx, rx) = oneshot::channel();
    {
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = guard.as_ref() {
            listener.on_authorize_code(move |code| {
                let _ = tx.send(code);
            });
        } else {
            return Err(AuthError::CodeDeliveryClosed);
        }
    }

    let url = flow.authorize_url(redirect_uri, scopes);
    launcher
        .launch(&url)
        .map_err(|reason| AuthError::BrowserLaunchFailed { reason })?;

    tracing::debug!("authorize flow: waiting for redirect");
    // The sender lives in the listener's handler slot; stopping the
    // listener drops it, which resolves this wait with an error.
    rx.await.map_err(|_| AuthError::CodeDeliveryClosed)
}

/// What the integrator delivered through the login form.
enum LoginSubmission {
    Credentials { email: String, password: String },
    GiveUp { reason: String },
}

/// Flow-side [`LoginSubmitter`] forwarding submissions into the pending
/// login step's channel.
struct ChannelSubmitter {
    tx: mpsc::UnboundedSender<LoginSubmission>,
}

impl LoginSubmitter for ChannelSubmitter {
    fn submit(&self, email: &str, password: &str) {
        let submission = LoginSubmission::Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        if self.tx.send(submission).is_err() {
            tracing::warn!("login submitted after the authorize flow ended");
        }
    }

    fn give_up(&self, reason: &str) {
        let submission = LoginSubmission::GiveUp {
            reason: reason.to_string(),
        };
        if self.tx.send(submission).is_err() {
            tracing::warn!("login abandoned after the authorize flow ended");
        }
    }
}

/// Scripted acquisition: authorize, then walk login (with retries on
/// invalid credentials) and the optional confirm step.
async fn acquire_via_scripted_login(
    flow: &CredentialFlow,
    form: &LoginFormController,
    redirect_uri: &str,
    scopes: &AuthScope,
) -> Result<AuthorizationCode, AuthError> {
    let csrf = match flow.authorize(redirect_uri, scopes).await {
        Ok(code) => return Ok(code),
        Err(CredentialFlowError::NeedsLogin(csrf)) => csrf,
        Err(other) => return Err(other.into()),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    form.attach_submitter(Arc::new(ChannelSubmitter { tx }));
    tracing::debug!("authorize flow: login required, activating form");
    form.activate_form(None);

    loop {
        let Some(submission) = rx.recv().await else {
            // Both controller and submitter gone; nothing can arrive.
            return Err(AuthError::LoginAbandoned {
                reason: "login form detached".to_string(),
            });
        };

        let (email, password) = match submission {
            LoginSubmission::GiveUp { reason } => {
                return Err(AuthError::LoginAbandoned { reason });
            }
            LoginSubmission::Credentials { email, password } => (email, password),
        };

        match flow.login_form(&csrf, &email, &password).await {
            Ok(code) => return Ok(code),
            Err(CredentialFlowError::InvalidCredentials) => {
                // Retryable: surface the cause and keep the step pending.
                tracing::debug!("authorize flow: invalid credentials, re-activating form");
                form.activate_form(Some(&CredentialFlowError::InvalidCredentials));
            }
            Err(CredentialFlowError::NeedsConfirmAuthorize(confirm)) => {
                // The consent form needs no user interaction; echo it back.
                tracing::debug!("authorize flow: resubmitting confirm-authorization form");
                return Ok(flow.authorize_form(&confirm).await?);
            }
            Err(other) => return Err(other.into()),
        }
    }
}

// Verify orchestrator types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Authorizer>();
    assert_send_sync::<AuthError>();
    assert_send_sync::<AcquireVia>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::config::AccessKey;
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

    fn config() -> LightboxConfig {
        LightboxConfig::builder()
            .access_key(AccessKey::new("consumer-key").unwrap())
            .callback_port(0)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_cached_token_short_circuits_without_network() {
        // No mock server exists; any network attempt would fail the flow.
        let store = Arc::new(MemoryTokenStore::with_token(token("at-cached")));
        let authorizer = Authorizer::new(config(), store).await.unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = authorizer.authorize(
            SecretKey::new("secret").unwrap(),
            AuthScope::none(),
            AcquireVia::ScriptedLogin(Arc::new(LoginFormController::new())),
            move |token| {
                let _ = tx.send(token);
            },
            |error| panic!("expected cached success, got {error}"),
        );

        let delivered = rx.await.unwrap();
        assert_eq!(delivered.access_token, "at-cached");
        handle.finished().await;
    }

    #[tokio::test]
    async fn test_server_start_failure_reports_before_any_network() {
        // Occupy the configured port so the listener cannot bind.
        let occupied = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let config = LightboxConfig::builder()
            .access_key(AccessKey::new("consumer-key").unwrap())
            .callback_host("127.0.0.1")
            .callback_port(port)
            .server_start_timeout(std::time::Duration::from_secs(1))
            .build()
            .unwrap();

        let authorizer = Authorizer::new(config, Arc::new(MemoryTokenStore::default()))
            .await
            .unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = authorizer.authorize(
            SecretKey::new("secret").unwrap(),
            AuthScope::none(),
            AcquireVia::ScriptedLogin(Arc::new(LoginFormController::new())),
            |token| panic!("expected failure, got token {}", token.access_token),
            move |error| {
                let _ = tx.send(error);
            },
        );

        let error = rx.await.unwrap();
        assert!(matches!(error, AuthError::ServerStartFailed));
        handle.finished().await;
    }

    #[tokio::test]
    async fn test_cancel_tears_down_listener_and_task() {
        struct NeverLauncher;
        impl BrowserLauncher for NeverLauncher {
            fn launch(&self, _uri: &str) -> Result<(), String> {
                Ok(())
            }
        }

        let authorizer = Authorizer::new(config(), Arc::new(MemoryTokenStore::default()))
            .await
            .unwrap();

        let handle = authorizer.authorize(
            SecretKey::new("secret").unwrap(),
            AuthScope::none(),
            AcquireVia::Browser(Arc::new(NeverLauncher)),
            |_token| {},
            |_error| {},
        );

        // Give the flow a moment to bind and start waiting.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.cancel();
        handle.finished().await;
    }
}
