//! Scraping of provider-rendered HTML pages.
//!
//! The scripted login flow treats the provider's authorize, login, and
//! confirm pages as documents to scrape, not a protocol: the interesting
//! values live in an embedded `<code>` element and in hidden form inputs.
//! The page shapes are fixed provider templates, so anchored regular
//! expressions are sufficient — no HTML parser is involved.

use crate::auth::oauth::code::{AuthenticityToken, AuthorizationCode};
use crate::auth::oauth::confirm_form::AuthorizeForm;
use regex::Regex;

/// Flash message the provider renders on a failed login.
const INVALID_CREDENTIALS_NOTICE: &str = "Invalid email or password";

/// Outcome of scanning a page for the confirm-authorization form.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ConfirmFormScrape {
    /// No confirm form on the page.
    Absent,
    /// A confirm form with all required fields.
    Complete(AuthorizeForm),
    /// A confirm form is present but required fields are missing; the page
    /// is malformed and the flow cannot continue.
    Incomplete,
}

/// Compiled scrapers for the provider's page shapes.
///
/// Compiled once per [`CredentialFlow`](crate::auth::oauth::CredentialFlow)
/// and reused for every page in a flow.
pub(crate) struct PageParser {
    embedded_code: Regex,
    input_tag: Regex,
    name_attr: Regex,
    value_attr: Regex,
    login_form: Regex,
    confirm_form: Regex,
}

impl PageParser {
    /// Compiles the scrapers.
    ///
    /// # Panics
    ///
    /// Panics if a static pattern fails to compile, which would indicate a
    /// bug in this crate rather than caller error.
    pub(crate) fn new() -> Self {
        Self {
            embedded_code: Regex::new(r"(?s)<code[^>]*>\s*([A-Za-z0-9._~-]+)\s*</code>")
                .expect("static pattern"),
            input_tag: Regex::new(r"<input[^>]*>").expect("static pattern"),
            name_attr: Regex::new(r#"name="([^"]*)""#).expect("static pattern"),
            value_attr: Regex::new(r#"value="([^"]*)""#).expect("static pattern"),
            login_form: Regex::new(r#"(?s)<form[^>]*action="[^"]*/login"[^>]*>(.*?)</form>"#)
                .expect("static pattern"),
            confirm_form: Regex::new(r#"(?s)<form[^>]*action="[^"]*/authorize"[^>]*>(.*?)</form>"#)
                .expect("static pattern"),
        }
    }

    /// Extracts an embedded authorization code, if the page carries one.
    pub(crate) fn authorization_code(&self, html: &str) -> Option<AuthorizationCode> {
        self.embedded_code
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|code| AuthorizationCode::new(code.as_str()))
    }

    /// Returns `true` if the page renders the provider's login form.
    pub(crate) fn has_login_form(&self, html: &str) -> bool {
        self.login_form_body(html).is_some()
    }

    /// Extracts the CSRF token from the page's login form.
    pub(crate) fn authenticity_token(&self, html: &str) -> Option<AuthenticityToken> {
        let body = self.login_form_body(html)?;
        self.form_fields(body)
            .into_iter()
            .find(|(name, _)| name == "authenticity_token")
            .map(|(_, value)| AuthenticityToken::new(value))
    }

    /// Scans the page for a confirm-authorization form.
    pub(crate) fn confirm_form(&self, html: &str) -> ConfirmFormScrape {
        let Some(captures) = self.confirm_form.captures(html) else {
            return ConfirmFormScrape::Absent;
        };
        let body = captures.get(1).map_or("", |body| body.as_str());

        AuthorizeForm::from_fields(self.form_fields(body))
            .map_or(ConfirmFormScrape::Incomplete, ConfirmFormScrape::Complete)
    }

    /// Returns `true` if the page carries the failed-login notice.
    pub(crate) fn has_invalid_credentials_notice(&self, html: &str) -> bool {
        html.contains(INVALID_CREDENTIALS_NOTICE)
    }

    fn login_form_body<'a>(&self, html: &'a str) -> Option<&'a str> {
        self.login_form
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|body| body.as_str())
    }

    /// Collects `(name, value)` pairs of the input tags in a form body,
    /// preserving document order. Inputs without a name are skipped;
    /// inputs without a value yield an empty string.
    fn form_fields(&self, form_body: &str) -> Vec<(String, String)> {
        self.input_tag
            .find_iter(form_body)
            .filter_map(|tag| {
                let tag = tag.as_str();
                let name = self
                    .name_attr
                    .captures(tag)
                    .and_then(|captures| captures.get(1))?
                    .as_str()
                    .to_string();
                let value = self
                    .value_attr
                    .captures(tag)
                    .and_then(|captures| captures.get(1))
                    .map_or(String::new(), |value| value.as_str().to_string());
                Some((name, value))
            })
            .collect()
    }
}
