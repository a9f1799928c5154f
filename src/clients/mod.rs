//! HTTP client types for authenticated Lightbox API communication.
//!
//! # Overview
//!
//! - [`HttpClient`]: bearer-token requests built from an
//!   [`AuthContext`](crate::auth::AuthContext), with rate-limit retry
//! - [`HttpResponse`]: the response envelope with provider header parsing
//! - [`RateLimit`] / [`PageInfo`]: the parsed `X-RateLimit-*` and paging
//!   headers
//! - [`JsonTree`]: lazy navigation over response bodies

mod errors;
mod http_client;
mod http_response;
mod json_tree;

pub use errors::HttpError;
pub use http_client::{HttpClient, CLIENT_VERSION, RETRY_WAIT_TIME};
pub use http_response::{HttpResponse, PageInfo, RateLimit};
pub use json_tree::JsonTree;
