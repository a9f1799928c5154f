//! Ephemeral localhost listener for the authorization redirect.
//!
//! During a browser-delegated authorization the provider redirects the
//! user's browser to a `redirect_uri` carrying the one-time code. The
//! [`CallbackListener`] is the minimal HTTP server standing at that URI:
//! it accepts the single expected `GET`, extracts the `code` query
//! parameter, renders a confirmation page to the browser, and hands the
//! code to a registered one-shot handler — in that order. The handler
//! never fires before the confirmation response has been fully written
//! and the connection shut down, so the browser is guaranteed to have
//! received its page by the time the application sees the code.

use crate::auth::oauth::code::AuthorizationCode;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Path component of the callback URI.
const CALLBACK_PATH: &str = "/callback";

/// Default time to wait for the listener to become ready.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Page rendered to the browser once the code has been extracted.
const CONFIRMATION_HTML: &str = "<!DOCTYPE html><html><body>\
    <h1>Authorization complete</h1>\
    <p>You can close this window and return to the application.</p>\
    </body></html>";

type CodeHandler = Box<dyn FnOnce(AuthorizationCode) + Send>;
type HandlerSlot = Arc<Mutex<Option<CodeHandler>>>;

/// Minimal one-shot HTTP listener for the OAuth redirect.
///
/// The listener is scoped to a single in-flight authorization: start it,
/// register a handler, await the code, stop it. It must not be shared by
/// two concurrent flows.
///
/// # Example
///
/// ```rust
/// use lightbox_api::auth::oauth::CallbackListener;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut listener = CallbackListener::new("127.0.0.1", 0); // ephemeral port
/// assert!(listener.start_serving(Duration::from_secs(1)).await);
///
/// // The URI reflects the actually bound port.
/// let uri = listener.callback_uri();
/// assert!(uri.starts_with("http://127.0.0.1:"));
/// assert!(uri.ends_with("/callback"));
///
/// listener.stop_serving();
/// # });
/// ```
pub struct CallbackListener {
    host: String,
    requested_port: u16,
    bound_addr: Option<SocketAddr>,
    accept_task: Option<JoinHandle<()>>,
    handler: HandlerSlot,
}

impl CallbackListener {
    /// Creates a listener for the given host and port.
    ///
    /// Port `0` requests an ephemeral port; [`callback_uri`](Self::callback_uri)
    /// reports the port actually bound once serving starts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            requested_port: port,
            bound_addr: None,
            accept_task: None,
            handler: Arc::new(Mutex::new(None)),
        }
    }

    /// The externally reachable URI the provider should redirect to.
    ///
    /// Reflects the actually bound port once [`start_serving`](Self::start_serving)
    /// has succeeded; before that it names the requested port.
    #[must_use]
    pub fn callback_uri(&self) -> String {
        let port = self
            .bound_addr
            .map_or(self.requested_port, |addr| addr.port());
        format!("http://{}:{port}{CALLBACK_PATH}", self.host)
    }

    /// Registers the one-shot handler for the extracted code.
    ///
    /// The handler is invoked at most once, and only after the HTML
    /// confirmation response has been fully flushed to the browser.
    /// Registering again replaces an unfired handler.
    pub fn on_authorize_code(&self, handler: impl FnOnce(AuthorizationCode) + Send + 'static) {
        *self.lock_handler() = Some(Box::new(handler));
    }

    /// Starts the listener, waiting up to `timeout` for it to become ready.
    ///
    /// Returns `false` — not an error — if the socket cannot be bound
    /// within the timeout; the caller has a well-defined fallback (report
    /// that the server did not start). Calling this while already serving
    /// is a no-op returning `true`.
    pub async fn start_serving(&mut self, timeout: Duration) -> bool {
        if self.accept_task.as_ref().is_some_and(|t| !t.is_finished()) {
            return true;
        }

        let bind = TcpListener::bind((self.host.as_str(), self.requested_port));
        let listener = match tokio::time::timeout(timeout, bind).await {
            Ok(Ok(listener)) => listener,
            Ok(Err(error)) => {
                tracing::warn!(%error, host = %self.host, port = self.requested_port,
                    "callback listener failed to bind");
                return false;
            }
            Err(_) => {
                tracing::warn!(host = %self.host, port = self.requested_port,
                    "callback listener did not become ready within {timeout:?}");
                return false;
            }
        };

        match listener.local_addr() {
            Ok(addr) => {
                tracing::debug!(%addr, "callback listener serving");
                self.bound_addr = Some(addr);
            }
            Err(error) => {
                tracing::warn!(%error, "callback listener bound but local address is unknown");
                return false;
            }
        }

        let handler = Arc::clone(&self.handler);
        self.accept_task = Some(tokio::spawn(accept_loop(listener, handler)));
        true
    }

    /// Tears down the listener and clears the registered handler.
    ///
    /// Idempotent; also unblocks any acquisition step waiting on the
    /// one-shot handler, since the handler is dropped unfired.
    pub fn stop_serving(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
            tracing::debug!("callback listener stopped");
        }
        self.bound_addr = None;
        *self.lock_handler() = None;
    }

    fn lock_handler(&self) -> std::sync::MutexGuard<'_, Option<CodeHandler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        self.stop_serving();
    }
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("callback_uri", &self.callback_uri())
            .field("serving", &self.accept_task.is_some())
            .finish_non_exhaustive()
    }
}

/// Accepts connections until one of them delivers a code.
///
/// Connections without a `code` parameter (stray favicon fetches and the
/// like) get the confirmation page and are otherwise ignored; the redirect
/// contract only defines requests that carry the parameter.
async fn accept_loop(listener: TcpListener, handler: HandlerSlot) {
    loop {
        let Ok((mut stream, peer)) = listener.accept().await else {
            return;
        };
        tracing::debug!(%peer, "callback connection accepted");

        let mut buffer = vec![0u8; 4096];
        let Ok(read) = stream.read(&mut buffer).await else {
            continue;
        };
        let request = String::from_utf8_lossy(&buffer[..read]);
        let code = extract_code(&request);

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            CONFIRMATION_HTML.len(),
            CONFIRMATION_HTML
        );

        // The browser-visible confirmation must be on the wire before the
        // application learns the code: write, flush, shut down, and only
        // then fire the handler.
        if stream.write_all(response.as_bytes()).await.is_err() {
            continue;
        }
        let _ = stream.flush().await;
        let _ = stream.shutdown().await;

        if let Some(code) = code {
            let handler = handler
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handler) = handler {
                handler(code);
            } else {
                tracing::warn!("authorization code arrived with no handler registered");
            }
            return;
        }
    }
}

/// Pulls the `code` query parameter out of the request line.
fn extract_code(request: &str) -> Option<AuthorizationCode> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;
    let query = target.split_once('?')?.1;

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("code=") {
            if value.is_empty() {
                continue;
            }
            let decoded = urlencoding::decode(value).ok()?;
            return Some(AuthorizationCode::new(decoded.into_owned()));
        }
    }
    None
}

// Verify CallbackListener is Send at compile time (it travels into the
// spawned authorize flow).
const _: fn() = || {
    const fn assert_send<T: Send>() {}
    assert_send::<CallbackListener>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_from_valid_request() {
        let request = "GET /callback?code=abc123 HTTP/1.1\r\nHost: localhost\r\n";
        assert_eq!(extract_code(request).unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_extract_code_with_extra_params() {
        let request = "GET /callback?state=xyz&code=abc123 HTTP/1.1\r\n";
        assert_eq!(extract_code(request).unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_extract_code_decodes_percent_escapes() {
        let request = "GET /callback?code=ab%2Fc HTTP/1.1\r\n";
        assert_eq!(extract_code(request).unwrap().as_str(), "ab/c");
    }

    #[test]
    fn test_extract_code_missing_or_empty() {
        assert!(extract_code("GET /callback?state=xyz HTTP/1.1\r\n").is_none());
        assert!(extract_code("GET /callback?code= HTTP/1.1\r\n").is_none());
        assert!(extract_code("POST /callback?code=abc HTTP/1.1\r\n").is_none());
        assert!(extract_code("").is_none());
    }

    #[tokio::test]
    async fn test_callback_uri_reflects_bound_ephemeral_port() {
        let mut listener = CallbackListener::new("127.0.0.1", 0);
        assert!(listener.start_serving(Duration::from_secs(1)).await);

        let uri = listener.callback_uri();
        assert!(uri.starts_with("http://127.0.0.1:"));
        assert!(uri.ends_with("/callback"));
        assert!(!uri.contains(":0/"));

        listener.stop_serving();
    }

    #[tokio::test]
    async fn test_start_serving_reports_failure_on_unavailable_socket() {
        // Occupy a port, then ask a second listener for the same one.
        let occupied = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut listener = CallbackListener::new("127.0.0.1", port);
        assert!(!listener.start_serving(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_stop_serving_is_idempotent() {
        let mut listener = CallbackListener::new("127.0.0.1", 0);
        assert!(listener.start_serving(Duration::from_secs(1)).await);
        listener.stop_serving();
        listener.stop_serving();
    }

    #[tokio::test]
    async fn test_handler_receives_code_after_response_closes() {
        let mut listener = CallbackListener::new("127.0.0.1", 0);
        assert!(listener.start_serving(Duration::from_secs(1)).await);

        let (tx, rx) = tokio::sync::oneshot::channel();
        listener.on_authorize_code(move |code| {
            let _ = tx.send(code);
        });

        let uri = listener.callback_uri();
        let body = reqwest::get(format!("{uri}?code=abc123"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        // The browser-visible page came back complete...
        assert!(body.contains("Authorization complete"));

        // ...and the handler observed exactly the sent code.
        let code = rx.await.unwrap();
        assert_eq!(code.as_str(), "abc123");

        listener.stop_serving();
    }
}
