//! Scripted, HTML-scraping login flow.
//!
//! [`CredentialFlow`] drives the provider's authorize, login, and confirm
//! pages programmatically, for headless and server contexts where no
//! interactive browser can be delegated to. It also owns the token
//! exchange, which both acquisition strategies share.
//!
//! # Outcomes, not exceptions
//!
//! Every operation returns a `Result`; nothing escapes the component
//! boundary as a panic. Two of the error variants are flow-continuation
//! signals rather than true failures:
//!
//! - [`CredentialFlowError::NeedsLogin`] carries the CSRF token the caller
//!   needs to submit the login form.
//! - [`CredentialFlowError::NeedsConfirmAuthorize`] carries the consent
//!   form fields the caller must echo back.
//!
//! # Example
//!
//! ```rust,ignore
//! let flow = CredentialFlow::new(&config);
//!
//! let code = match flow.authorize(&redirect_uri, &scopes).await {
//!     Ok(code) => code,
//!     Err(CredentialFlowError::NeedsLogin(csrf)) => {
//!         flow.login_form(&csrf, "user@example.com", "hunter2").await?
//!     }
//!     Err(other) => return Err(other.into()),
//! };
//!
//! let token = flow.token(code, config.access_key(), &secret, &redirect_uri).await?;
//! ```

use crate::auth::oauth::code::{AuthenticityToken, AuthorizationCode};
use crate::auth::oauth::confirm_form::AuthorizeForm;
use crate::auth::oauth::page::{ConfirmFormScrape, PageParser};
use crate::auth::{AuthScope, AuthToken};
use crate::config::{AccessKey, LightboxConfig, SecretKey};
use thiserror::Error;

/// Value of the `utf8` field Rails-style forms expect.
const UTF8_CHECKMARK: &str = "\u{2713}";

/// Errors and flow-continuation outcomes of the scripted login flow.
///
/// # Thread Safety
///
/// `CredentialFlowError` is `Send + Sync`, making it safe to move across
/// task boundaries.
#[derive(Debug, Error)]
pub enum CredentialFlowError {
    /// The provider rendered its login form instead of a code.
    ///
    /// Not a terminal failure: the carried [`AuthenticityToken`] is what
    /// the caller needs to submit credentials and continue the flow.
    #[error("login required: the provider rendered its login form")]
    NeedsLogin(AuthenticityToken),

    /// The provider rendered its consent form instead of a code.
    ///
    /// Not a terminal failure: resubmitting the carried [`AuthorizeForm`]
    /// via [`CredentialFlow::authorize_form`] continues the flow without
    /// user interaction.
    #[error("confirmation required: the provider rendered its consent form")]
    NeedsConfirmAuthorize(AuthorizeForm),

    /// The provider rejected the submitted email/password pair.
    ///
    /// Retryable: the caller may ask for credentials again and resubmit.
    #[error("the provider rejected the submitted credentials")]
    InvalidCredentials,

    /// Echoing the consent form back did not yield a code.
    #[error("resubmitting the confirm-authorization form did not yield a code")]
    ConfirmAuthorizeFailed,

    /// A page was missing the elements this flow relies on.
    #[error("unexpected page from the provider: {reason}")]
    UnexpectedPage {
        /// What was expected and not found.
        reason: String,
    },

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The response body (or a description of why it was unusable).
        body: String,
    },

    /// The request never produced a response.
    #[error("network error talking to the provider: {0}")]
    Network(#[from] reqwest::Error),
}

/// Drives the provider's HTML login pages and the token endpoint.
///
/// A `CredentialFlow` is scoped to a single in-flight authorization; it is
/// cheap to construct and must not be shared between two concurrent flows.
pub struct CredentialFlow {
    client: reqwest::Client,
    config: LightboxConfig,
    parser: PageParser,
}

impl CredentialFlow {
    /// Creates a flow for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &LightboxConfig) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
            parser: PageParser::new(),
        }
    }

    /// Issues the authorize request and scrapes the returned page.
    ///
    /// # Errors
    ///
    /// - `Ok(code)` when the page embeds an authorization code
    /// - [`CredentialFlowError::NeedsLogin`] when the page is the login
    ///   form (carries the CSRF token needed to continue)
    /// - [`CredentialFlowError::UnexpectedPage`] when neither is present
    /// - [`CredentialFlowError::Http`] / [`CredentialFlowError::Network`]
    ///   for transport-level failures
    pub async fn authorize(
        &self,
        redirect_uri: &str,
        scopes: &AuthScope,
    ) -> Result<AuthorizationCode, CredentialFlowError> {
        let url = self.authorize_url(redirect_uri, scopes);
        tracing::debug!(%url, "requesting authorization page");

        let body = self.fetch(self.client.get(&url)).await?;

        if let Some(code) = self.parser.authorization_code(&body) {
            return Ok(code);
        }

        if self.parser.has_login_form(&body) {
            return match self.parser.authenticity_token(&body) {
                Some(token) => Err(CredentialFlowError::NeedsLogin(token)),
                None => Err(CredentialFlowError::UnexpectedPage {
                    reason: "login form without an authenticity_token field".to_string(),
                }),
            };
        }

        Err(CredentialFlowError::UnexpectedPage {
            reason: "neither an authorization code nor a login form".to_string(),
        })
    }

    /// Submits credentials to the provider's login endpoint.
    ///
    /// # Errors
    ///
    /// - `Ok(code)` when login lands directly on a code page
    /// - [`CredentialFlowError::NeedsConfirmAuthorize`] when the provider
    ///   inserts its consent step (carries the form to echo back)
    /// - [`CredentialFlowError::InvalidCredentials`] when the provider
    ///   rejects the email/password pair — retryable
    /// - [`CredentialFlowError::UnexpectedPage`] when the consent form is
    ///   present but malformed, or the page has none of the known shapes
    /// - [`CredentialFlowError::Http`] / [`CredentialFlowError::Network`]
    ///   for transport-level failures
    pub async fn login_form(
        &self,
        authenticity_token: &AuthenticityToken,
        email: &str,
        password: &str,
    ) -> Result<AuthorizationCode, CredentialFlowError> {
        let url = self.config.base_url().join("oauth/login");
        tracing::debug!(%url, "submitting login form");

        let fields = [
            ("utf8", UTF8_CHECKMARK),
            ("authenticity_token", authenticity_token.as_str()),
            ("user[email]", email),
            ("user[password]", password),
        ];
        let body = self.fetch(self.client.post(&url).form(&fields)).await?;

        if let Some(code) = self.parser.authorization_code(&body) {
            return Ok(code);
        }

        if self.parser.has_invalid_credentials_notice(&body) {
            return Err(CredentialFlowError::InvalidCredentials);
        }

        match self.parser.confirm_form(&body) {
            ConfirmFormScrape::Complete(form) => {
                Err(CredentialFlowError::NeedsConfirmAuthorize(form))
            }
            ConfirmFormScrape::Incomplete => Err(CredentialFlowError::UnexpectedPage {
                reason: "confirm-authorization form is missing required fields".to_string(),
            }),
            ConfirmFormScrape::Absent => Err(CredentialFlowError::UnexpectedPage {
                reason: "no code, confirm form, or failed-login notice after login".to_string(),
            }),
        }
    }

    /// Echoes the consent form back to the authorize endpoint.
    ///
    /// # Errors
    ///
    /// - `Ok(code)` when the resulting page embeds a code
    /// - [`CredentialFlowError::ConfirmAuthorizeFailed`] when it does not
    /// - [`CredentialFlowError::Http`] / [`CredentialFlowError::Network`]
    ///   for transport-level failures
    pub async fn authorize_form(
        &self,
        form: &AuthorizeForm,
    ) -> Result<AuthorizationCode, CredentialFlowError> {
        let url = self.config.base_url().join("oauth/authorize");
        tracing::debug!(%url, "resubmitting confirm-authorization form");

        let body = self.fetch(self.client.post(&url).form(form.fields())).await?;

        self.parser
            .authorization_code(&body)
            .ok_or(CredentialFlowError::ConfirmAuthorizeFailed)
    }

    /// Exchanges a one-time code for an access token.
    ///
    /// The code is consumed by value: once exchanged (successfully or not)
    /// it cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialFlowError::Http`] when the token endpoint
    /// answers with a non-success status or an unparseable body, and
    /// [`CredentialFlowError::Network`] when the request never completes.
    pub async fn token(
        &self,
        code: AuthorizationCode,
        access_key: &AccessKey,
        secret_key: &SecretKey,
        redirect_uri: &str,
    ) -> Result<AuthToken, CredentialFlowError> {
        let url = self.config.base_url().join("oauth/token");
        tracing::debug!(%url, "exchanging authorization code for token");

        let code = code.into_inner();
        let fields = [
            ("client_id", access_key.as_ref()),
            ("client_secret", secret_key.reveal()),
            ("redirect_uri", redirect_uri),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(&url).form(&fields).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialFlowError::Http { status, body });
        }

        response
            .json::<AuthToken>()
            .await
            .map_err(|error| CredentialFlowError::Http {
                status,
                body: format!("failed to parse token response: {error}"),
            })
    }

    /// Builds the authorize URL for the given redirect target and scopes.
    ///
    /// The scope value keeps its `+`-joined encoding literally: flags are
    /// validated to URL-safe characters, and the provider expects the
    /// separator unescaped.
    pub(crate) fn authorize_url(&self, redirect_uri: &str, scopes: &AuthScope) -> String {
        let base = self.config.base_url().join("oauth/authorize");
        let mut url = format!(
            "{base}?client_id={}&redirect_uri={}&response_type=code",
            urlencoding::encode(self.config.access_key().as_ref()),
            urlencoding::encode(redirect_uri),
        );
        if !scopes.is_none() {
            url.push_str("&scope=");
            url.push_str(&scopes.to_string());
        }
        url
    }

    /// Sends a request and returns the body of a successful response.
    async fn fetch(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, CredentialFlowError> {
        let response = request.send().await?;
        let status = response.status();

        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            // A failed login can come back as a 401/422 page carrying the
            // invalid-credentials notice rather than a code page.
            if self.parser.has_invalid_credentials_notice(&body) {
                return Err(CredentialFlowError::InvalidCredentials);
            }
            return Err(CredentialFlowError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl std::fmt::Debug for CredentialFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialFlow")
            .field("base_url", self.config.base_url())
            .finish_non_exhaustive()
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CredentialFlow>();
    assert_send_sync::<CredentialFlowError>();
};
