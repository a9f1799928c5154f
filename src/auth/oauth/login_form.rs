//! The pluggable login-form bridge between the authorizer and the
//! integrator's UI.
//!
//! UI rendering is out of scope for this crate: during a scripted login
//! the authorizer only ever asks for credentials through a
//! [`LoginFormController`], and the integrator answers through the same
//! controller. The controller is a small state machine:
//!
//! ```text
//! Detached -> (attach_listener / attach_submitter) -> Attached
//! Attached -> submit  -> Attached        (retries stay attached)
//! Attached -> give_up -> Detached        (both sides detached)
//! ```
//!
//! Once detached, the controller cannot serve a new flow without
//! reattachment.

use crate::auth::oauth::CredentialFlowError;
use std::sync::{Arc, Mutex, PoisonError};

/// The integrator-side callbacks: how the UI learns it should render a
/// login form, and that the form is no longer needed.
pub trait LoginFormListener: Send + Sync {
    /// Asks the integrator to show a login form.
    ///
    /// `cause` is `None` on first activation and carries the previous
    /// failure when the form is re-activated after a rejected attempt.
    fn form_activated(&self, cause: Option<&CredentialFlowError>);

    /// Notifies the integrator that the form was abandoned via
    /// [`LoginFormController::give_up`] and should be torn down.
    fn form_dismissed(&self, reason: &str);
}

/// The flow-side sink: where submitted credentials (or the decision to
/// give up) are delivered while a login step is pending.
pub trait LoginSubmitter: Send + Sync {
    /// Delivers one email/password attempt to the pending login step.
    fn submit(&self, email: &str, password: &str);

    /// Delivers the decision to abandon the login.
    fn give_up(&self, reason: &str);
}

#[derive(Default)]
struct Attachments {
    listener: Option<Arc<dyn LoginFormListener>>,
    submitter: Option<Arc<dyn LoginSubmitter>>,
}

/// Bridges the authorizer's pending login step and the integrator's UI.
///
/// Exactly one listener and one submitter may be attached at a time;
/// attaching a second while one is active is a caller error — logged, not
/// fatal — and the first attachment wins. Calls that need an attachment
/// while none is present are likewise logged and dropped.
///
/// # Thread Safety
///
/// The controller is shared behind an `Arc` between the authorizer task
/// and the UI thread; all methods take `&self`. Callbacks are invoked
/// outside the internal lock, so a listener may call
/// [`submit`](Self::submit) synchronously from
/// [`form_activated`](LoginFormListener::form_activated) without
/// deadlocking.
#[derive(Default)]
pub struct LoginFormController {
    inner: Mutex<Attachments>,
}

impl LoginFormController {
    /// Creates a detached controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the integrator's listener. First attachment wins.
    pub fn attach_listener(&self, listener: Arc<dyn LoginFormListener>) {
        let mut inner = self.lock();
        if inner.listener.is_some() {
            tracing::warn!("login form listener already attached; ignoring second attachment");
            return;
        }
        inner.listener = Some(listener);
    }

    /// Attaches the flow-side submitter. First attachment wins.
    pub fn attach_submitter(&self, submitter: Arc<dyn LoginSubmitter>) {
        let mut inner = self.lock();
        if inner.submitter.is_some() {
            tracing::warn!("login submitter already attached; ignoring second attachment");
            return;
        }
        inner.submitter = Some(submitter);
    }

    /// Returns `true` while a submitter is attached (a login step is
    /// pending).
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lock().submitter.is_some()
    }

    /// Asks the integrator to surface the login form.
    ///
    /// Called by the authorizer; `cause` is non-`None` only when
    /// re-activating after a failed attempt.
    pub fn activate_form(&self, cause: Option<&CredentialFlowError>) {
        let listener = self.lock().listener.clone();
        match listener {
            Some(listener) => listener.form_activated(cause),
            None => tracing::warn!("login form activated with no listener attached"),
        }
    }

    /// Forwards credentials to the pending login step.
    ///
    /// May only be called while a submitter is attached; otherwise the
    /// attempt is logged and dropped.
    pub fn submit(&self, email: &str, password: &str) {
        let submitter = self.lock().submitter.clone();
        match submitter {
            Some(submitter) => submitter.submit(email, password),
            None => tracing::warn!("login submitted while no login step is pending"),
        }
    }

    /// Abandons the login: notifies the listener, forwards the give-up to
    /// the pending step, and detaches both sides.
    pub fn give_up(&self, reason: &str) {
        let (listener, submitter) = {
            let mut inner = self.lock();
            (inner.listener.take(), inner.submitter.take())
        };

        if let Some(listener) = listener {
            listener.form_dismissed(reason);
        }
        match submitter {
            Some(submitter) => submitter.give_up(reason),
            None => tracing::warn!("login abandoned while no login step is pending"),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Attachments> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LoginFormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("LoginFormController")
            .field("listener_attached", &inner.listener.is_some())
            .field("submitter_attached", &inner.submitter.is_some())
            .finish()
    }
}

// Verify LoginFormController is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LoginFormController>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener {
        activations: AtomicUsize,
        dismissals: AtomicUsize,
    }

    impl LoginFormListener for CountingListener {
        fn form_activated(&self, _cause: Option<&CredentialFlowError>) {
            self.activations.fetch_add(1, Ordering::SeqCst);
        }

        fn form_dismissed(&self, _reason: &str) {
            self.dismissals.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        submissions: Mutex<Vec<(String, String)>>,
        give_ups: Mutex<Vec<String>>,
    }

    impl LoginSubmitter for RecordingSubmitter {
        fn submit(&self, email: &str, password: &str) {
            self.submissions
                .lock()
                .unwrap()
                .push((email.to_string(), password.to_string()));
        }

        fn give_up(&self, reason: &str) {
            self.give_ups.lock().unwrap().push(reason.to_string());
        }
    }

    #[test]
    fn test_submit_forwards_to_attached_submitter() {
        let controller = LoginFormController::new();
        let submitter = Arc::new(RecordingSubmitter::default());
        controller.attach_submitter(Arc::clone(&submitter) as _);

        controller.submit("me@example.com", "hunter2");

        let submissions = submitter.submissions.lock().unwrap();
        assert_eq!(
            submissions.as_slice(),
            &[("me@example.com".to_string(), "hunter2".to_string())]
        );
    }

    #[test]
    fn test_submit_without_submitter_is_dropped() {
        let controller = LoginFormController::new();
        // Must not panic; the caller error is logged.
        controller.submit("me@example.com", "hunter2");
    }

    #[test]
    fn test_first_submitter_attachment_wins() {
        let controller = LoginFormController::new();
        let first = Arc::new(RecordingSubmitter::default());
        let second = Arc::new(RecordingSubmitter::default());

        controller.attach_submitter(Arc::clone(&first) as _);
        controller.attach_submitter(Arc::clone(&second) as _);
        controller.submit("me@example.com", "pw");

        assert_eq!(first.submissions.lock().unwrap().len(), 1);
        assert!(second.submissions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_activate_form_reaches_listener() {
        let controller = LoginFormController::new();
        let listener = Arc::new(CountingListener::default());
        controller.attach_listener(Arc::clone(&listener) as _);

        controller.activate_form(None);
        controller.activate_form(Some(&CredentialFlowError::InvalidCredentials));

        assert_eq!(listener.activations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_give_up_notifies_both_sides_and_detaches() {
        let controller = LoginFormController::new();
        let listener = Arc::new(CountingListener::default());
        let submitter = Arc::new(RecordingSubmitter::default());
        controller.attach_listener(Arc::clone(&listener) as _);
        controller.attach_submitter(Arc::clone(&submitter) as _);
        assert!(controller.is_attached());

        controller.give_up("user closed the dialog");

        assert_eq!(listener.dismissals.load(Ordering::SeqCst), 1);
        assert_eq!(
            submitter.give_ups.lock().unwrap().as_slice(),
            &["user closed the dialog".to_string()]
        );
        assert!(!controller.is_attached());

        // Detached: further submissions are dropped, not forwarded.
        controller.submit("me@example.com", "pw");
        assert!(submitter.submissions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_controller_can_be_reattached_after_give_up() {
        let controller = LoginFormController::new();
        controller.attach_submitter(Arc::new(RecordingSubmitter::default()) as _);
        controller.give_up("done");
        assert!(!controller.is_attached());

        let fresh = Arc::new(RecordingSubmitter::default());
        controller.attach_submitter(Arc::clone(&fresh) as _);
        controller.submit("me@example.com", "pw");
        assert_eq!(fresh.submissions.lock().unwrap().len(), 1);
    }
}
