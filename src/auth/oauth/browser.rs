//! Browser-launch capability.

use std::fmt;

/// Launches the user's browser at the provider's authorization URL.
///
/// The authorizer treats browser launching as an injected capability so
/// hosts can substitute their own mechanism (an embedded webview, a
/// remote display, a test double). [`SystemBrowser`] is the default.
pub trait BrowserLauncher: Send + Sync {
    /// Opens `uri` in a browser.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description when no browser could be
    /// launched; the authorize flow treats this as terminal, since no
    /// redirect will ever arrive.
    fn launch(&self, uri: &str) -> Result<(), String>;
}

/// [`BrowserLauncher`] that opens the system default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, uri: &str) -> Result<(), String> {
        tracing::debug!(%uri, "opening system browser");
        webbrowser::open(uri).map_err(|error| error.to_string())
    }
}

impl fmt::Display for SystemBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("system default browser")
    }
}
