//! The provider's confirm-authorization form.

use std::fmt;

/// The hidden fields a confirm-authorization form must echo back.
///
/// Order matters for the provider, so the required names are listed in the
/// order they appear in the rendered page.
pub const REQUIRED_CONFIRM_FIELDS: [&str; 7] = [
    "utf8",
    "authenticity_token",
    "client_id",
    "redirect_uri",
    "state",
    "response_type",
    "scope",
];

/// An intermediate consent form some authorizations insert after login.
///
/// The provider renders the form with a fixed set of hidden fields and
/// expects them echoed back verbatim — same names, same values, same order.
/// Construction validates that every required field is present; a page
/// missing any of them is malformed and the scrape fails upstream.
///
/// # Example
///
/// ```rust
/// use lightbox_api::auth::oauth::AuthorizeForm;
///
/// let form = AuthorizeForm::from_fields(vec![
///     ("utf8".into(), "\u{2713}".into()),
///     ("authenticity_token".into(), "csrf".into()),
///     ("client_id".into(), "key".into()),
///     ("redirect_uri".into(), "http://localhost:3000/callback".into()),
///     ("state".into(), "st".into()),
///     ("response_type".into(), "code".into()),
///     ("scope".into(), "read_photos".into()),
/// ]);
/// assert!(form.is_some());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizeForm {
    fields: Vec<(String, String)>,
}

impl AuthorizeForm {
    /// Builds a form from scraped `(name, value)` pairs, preserving order.
    ///
    /// Returns `None` unless all of [`REQUIRED_CONFIRM_FIELDS`] are
    /// present. Extra fields are kept — the form is echoed back whole.
    #[must_use]
    pub fn from_fields(fields: Vec<(String, String)>) -> Option<Self> {
        let all_present = REQUIRED_CONFIRM_FIELDS
            .iter()
            .all(|required| fields.iter().any(|(name, _)| name == required));

        all_present.then_some(Self { fields })
    }

    /// Returns the fields in page order, for resubmission.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns the value of a field by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for AuthorizeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The authenticity token is a credential; list field names only.
        f.debug_struct("AuthorizeForm")
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> Vec<(String, String)> {
        REQUIRED_CONFIRM_FIELDS
            .iter()
            .map(|name| ((*name).to_string(), format!("{name}-value")))
            .collect()
    }

    #[test]
    fn test_accepts_complete_field_set() {
        let form = AuthorizeForm::from_fields(complete_fields()).unwrap();
        assert_eq!(form.fields().len(), 7);
        assert_eq!(form.value("state"), Some("state-value"));
    }

    #[test]
    fn test_rejects_missing_required_field() {
        for missing in REQUIRED_CONFIRM_FIELDS {
            let fields: Vec<_> = complete_fields()
                .into_iter()
                .filter(|(name, _)| name != missing)
                .collect();
            assert!(
                AuthorizeForm::from_fields(fields).is_none(),
                "form without '{missing}' should be rejected"
            );
        }
    }

    #[test]
    fn test_preserves_field_order() {
        let mut fields = complete_fields();
        fields.reverse();
        let form = AuthorizeForm::from_fields(fields.clone()).unwrap();
        assert_eq!(form.fields(), fields.as_slice());
    }

    #[test]
    fn test_keeps_extra_fields() {
        let mut fields = complete_fields();
        fields.push(("commit".to_string(), "Authorize".to_string()));
        let form = AuthorizeForm::from_fields(fields).unwrap();
        assert_eq!(form.value("commit"), Some("Authorize"));
    }

    #[test]
    fn test_debug_hides_values() {
        let form = AuthorizeForm::from_fields(complete_fields()).unwrap();
        let debug = format!("{form:?}");
        assert!(debug.contains("authenticity_token"));
        assert!(!debug.contains("authenticity_token-value"));
    }
}
