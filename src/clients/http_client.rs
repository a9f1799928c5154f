//! Authenticated HTTP client for Lightbox API communication.
//!
//! This module provides the [`HttpClient`] type for making bearer-token
//! requests against the API with automatic rate-limit retry handling.

use std::collections::HashMap;

use crate::auth::AuthContext;
use crate::clients::errors::HttpError;
use crate::clients::http_response::HttpResponse;
use crate::config::LightboxConfig;

/// Fixed retry wait when the provider does not send `Retry-After`.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Client version from Cargo.toml.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making authenticated requests to the Lightbox API.
///
/// The client handles:
/// - URL construction from the configured base URL
/// - Default headers including User-Agent and the bearer token taken from
///   the [`AuthContext`] at request time (so a sign-out is observed
///   immediately)
/// - A single automatic retry on 429 responses, honoring `Retry-After`
/// - Provider header parsing into [`HttpResponse`]
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async
/// tasks.
///
/// # Example
///
/// ```rust,ignore
/// let client = HttpClient::new(&config, session.context());
///
/// let response = client.get("photos", &[("feature", "popular")]).await?;
/// for photo in response.tree().at("photos").iter() {
///     println!("{:?}", photo.at("name").str());
/// }
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    context: AuthContext,
    user_agent: String,
}

impl HttpClient {
    /// Creates a client for the given configuration and auth context.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &LightboxConfig, context: AuthContext) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Lightbox API Library v{CLIENT_VERSION}");

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url().as_ref().to_string(),
            context,
            user_agent,
        }
    }

    /// Sends an authenticated `GET` request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::SignedOut`] without touching the network when
    /// no session is current, [`HttpError::Transport`] for network
    /// failures, and never treats non-2xx statuses as errors — callers
    /// check [`HttpResponse::is_ok`].
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let request = self
            .client
            .get(self.url(path))
            .query(query)
            .headers(self.default_headers()?);
        self.execute(request).await
    }

    /// Sends an authenticated `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Same contract as [`get`](Self::get).
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, HttpError> {
        let request = self
            .client
            .post(self.url(path))
            .json(body)
            .headers(self.default_headers()?);
        self.execute(request).await
    }

    /// Sends an authenticated `DELETE` request.
    ///
    /// # Errors
    ///
    /// Same contract as [`get`](Self::get).
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, HttpError> {
        let request = self
            .client
            .delete(self.url(path))
            .headers(self.default_headers()?);
        self.execute(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds the per-request header set.
    ///
    /// The bearer token is read from the context here, not at client
    /// construction, so the client observes `reset`/`clear` transitions
    /// made after it was created.
    fn default_headers(&self) -> Result<reqwest::header::HeaderMap, HttpError> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

        let token = self.context.token()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Ok(mut value) = HeaderValue::from_str(&token.authorization_header()) {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Sends the request, retrying once on 429.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, HttpError> {
        let retry = request.try_clone();

        let response = Self::into_envelope(request.send().await?).await;
        if response.code != 429 {
            return Ok(response);
        }

        let Some(retry) = retry else {
            return Ok(response);
        };

        let wait = response
            .retry_after
            .map_or(RETRY_WAIT_TIME, |seconds| seconds.ceil() as u64);
        tracing::debug!(wait, "rate limited; retrying once");
        tokio::time::sleep(std::time::Duration::from_secs(wait)).await;

        Ok(Self::into_envelope(retry.send().await?).await)
    }

    async fn into_envelope(response: reqwest::Response) -> HttpResponse {
        let code = response.status().as_u16();

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_lowercase())
                    .or_default()
                    .push(value.to_string());
            }
        }

        let text = response.text().await.unwrap_or_default();
        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::Null)
        };

        HttpResponse::new(code, headers, body)
    }
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, TokenCache};
    use crate::config::AccessKey;
    use crate::{AuthToken, BaseUrl, LightboxConfig};
    use chrono::Utc;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn signed_in_context(server: &MockServer) -> (LightboxConfig, crate::AuthContext) {
        let config = LightboxConfig::builder()
            .access_key(AccessKey::new("key").unwrap())
            .base_url(BaseUrl::new(server.uri()).unwrap())
            .build()
            .unwrap();

        let cache = TokenCache::new(
            AccessKey::new("key").unwrap(),
            Arc::new(MemoryTokenStore::default()),
        )
        .await
        .unwrap();
        cache
            .reset(AuthToken {
                access_token: "at-1".to_string(),
                token_type: "bearer".to_string(),
                refresh_token: None,
                scope: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let context = cache.context();
        (config, context)
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token_and_parses_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos"))
            .and(query_param("feature", "popular"))
            .and(header("authorization", "Bearer at-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-page", "1")
                    .insert_header("x-total-pages", "4")
                    .set_body_json(serde_json::json!({"photos": []})),
            )
            .mount(&server)
            .await;

        let (config, context) = signed_in_context(&server).await;
        let client = HttpClient::new(&config, context);

        let response = client.get("photos", &[("feature", "popular")]).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.page_info.page, Some(1));
        assert!(response.page_info.has_next_page());
    }

    #[tokio::test]
    async fn test_signed_out_request_fails_without_network() {
        // Server with no mounted mocks: any request would 404, but the
        // client must fail before sending anything.
        let server = MockServer::start().await;
        let config = LightboxConfig::builder()
            .access_key(AccessKey::new("key").unwrap())
            .base_url(BaseUrl::new(server.uri()).unwrap())
            .build()
            .unwrap();

        let cache = TokenCache::new(
            AccessKey::new("key").unwrap(),
            Arc::new(MemoryTokenStore::default()),
        )
        .await
        .unwrap();

        let client = HttpClient::new(&config, cache.context());
        let result = client.get("photos", &[]).await;
        assert!(matches!(result, Err(HttpError::SignedOut(_))));
    }

    #[tokio::test]
    async fn test_retries_once_on_rate_limit() {
        let server = MockServer::start().await;
        // First call: 429 with a tiny Retry-After. Second call: 200.
        Mock::given(method("GET"))
            .and(path("/photos"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "0")
                    .set_body_json(serde_json::json!({})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let (config, context) = signed_in_context(&server).await;
        let client = HttpClient::new(&config, context);

        let response = client.get("photos", &[]).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.tree().at("ok").bool(), Some(true));
    }

    #[tokio::test]
    async fn test_non_success_statuses_are_responses_not_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/404"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "not found"})),
            )
            .mount(&server)
            .await;

        let (config, context) = signed_in_context(&server).await;
        let client = HttpClient::new(&config, context);

        let response = client.get("photos/404", &[]).await.unwrap();
        assert!(!response.is_ok());
        assert_eq!(response.code, 404);
        assert_eq!(response.tree().at("error").str(), Some("not found"));
    }
}
