//! Authorization code and CSRF token newtypes.

use std::fmt;

/// A one-time authorization code issued by the provider.
///
/// The code is short-lived and single-use. The token exchange consumes it
/// **by value**, so the type system enforces that a code is spent exactly
/// once; there is no way to re-exchange a code without re-acquiring one.
///
/// The `Debug` implementation masks the value — codes are credentials for
/// the duration of their lifetime and should not land in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Wraps a code extracted from a provider page or callback request.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Consumes the code, yielding the raw value for the token exchange.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the code value without consuming it.
    ///
    /// Exists for request building and assertions; the exchange itself
    /// takes the code by value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(*****)")
    }
}

/// The CSRF-protection value scraped from a provider-rendered login page.
///
/// The provider refuses login submissions that do not echo the
/// `authenticity_token` it rendered into the form, proving the form was
/// legitimately fetched before being submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticityToken(String);

impl AuthenticityToken {
    /// Wraps a token extracted from a login page.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Verify newtypes are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthorizationCode>();
    assert_send_sync::<AuthenticityToken>();
};
