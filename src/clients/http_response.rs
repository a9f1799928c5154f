//! HTTP response envelope and provider header parsing.
//!
//! This module provides the [`HttpResponse`] type and the parsers for the
//! provider's pagination and rate-limit headers.

use crate::clients::json_tree::JsonTree;
use std::collections::HashMap;

/// Rate limit information parsed from the `X-RateLimit-*` headers.
///
/// The provider reports a per-window request budget:
///
/// - `X-RateLimit-Limit`: requests allowed in the current window
/// - `X-RateLimit-Remaining`: requests left in the window
/// - `X-RateLimit-Reset`: Unix time the window resets
///
/// # Example
///
/// ```rust
/// use lightbox_api::clients::RateLimit;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("x-ratelimit-limit".to_string(), vec!["1000".to_string()]);
/// headers.insert("x-ratelimit-remaining".to_string(), vec!["998".to_string()]);
/// headers.insert("x-ratelimit-reset".to_string(), vec!["1700000060".to_string()]);
///
/// let limit = RateLimit::from_headers(&headers).unwrap();
/// assert_eq!(limit.limit, 1000);
/// assert_eq!(limit.remaining, 998);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed in the current window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Unix time at which the window resets.
    pub reset: i64,
}

impl RateLimit {
    /// Parses the rate-limit headers.
    ///
    /// Returns `None` unless all three headers are present and numeric.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Option<Self> {
        let first = |name: &str| headers.get(name).and_then(|values| values.first());

        Some(Self {
            limit: first("x-ratelimit-limit")?.parse().ok()?,
            remaining: first("x-ratelimit-remaining")?.parse().ok()?,
            reset: first("x-ratelimit-reset")?.parse().ok()?,
        })
    }
}

/// Pagination information parsed from the provider's paging headers.
///
/// List endpoints report page-number pagination:
///
/// - `X-Page`: the current page (1-based)
/// - `X-Total-Pages`: how many pages exist
/// - `X-Total-Items`: how many items exist across all pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// The current page, if reported.
    pub page: Option<u32>,
    /// The total number of pages, if reported.
    pub total_pages: Option<u32>,
    /// The total number of items, if reported.
    pub total_items: Option<u64>,
}

impl PageInfo {
    /// Parses the paging headers; absent or malformed headers yield
    /// `None` fields rather than an error.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Self {
        let first = |name: &str| headers.get(name).and_then(|values| values.first());

        Self {
            page: first("x-page").and_then(|value| value.parse().ok()),
            total_pages: first("x-total-pages").and_then(|value| value.parse().ok()),
            total_items: first("x-total-items").and_then(|value| value.parse().ok()),
        }
    }

    /// Returns `true` when a further page is known to exist.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        match (self.page, self.total_pages) {
            (Some(page), Some(total)) => page < total,
            _ => false,
        }
    }
}

/// An HTTP response from the Lightbox API.
///
/// Contains the response status code, headers, parsed body, and the
/// provider-specific header values (rate limits, pagination) parsed out
/// at construction.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased names (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Rate limit state, when the provider reported it.
    pub rate_limit: Option<RateLimit>,
    /// Pagination state, when the provider reported it.
    pub page_info: PageInfo,
    /// Seconds to wait before retrying (from `Retry-After`).
    pub retry_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a response envelope, parsing the provider headers.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let rate_limit = RateLimit::from_headers(&headers);
        let page_info = PageInfo::from_headers(&headers);
        let retry_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            rate_limit,
            page_info,
            retry_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns a lazy navigator over the response body.
    #[must_use]
    pub const fn tree(&self) -> JsonTree<'_> {
        JsonTree::new(&self.body)
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// Useful for debugging; include it in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
