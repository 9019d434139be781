//! The authentication backend capability.
//!
//! Eventide doesn't implement authentication itself: that's the job of
//! whatever identity provider the deployment uses (Firebase, Auth0,
//! Supabase, a custom service). The session store only needs two things
//! from it:
//!
//! - a stream of "who is signed in now" events ([`AuthBackend::on_session_change`])
//! - credential-based sign-in / sign-up / sign-out calls that, on success,
//!   cause the stream to fire
//!
//! [`InMemoryAuthBackend`](crate::InMemoryAuthBackend) implements this for
//! development and tests.

use std::fmt;
use std::future::Future;

use eventide_protocol::{AuthUser, Identity};

use crate::AuthError;

/// A session-change event from the live authentication stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user is signed in (initial state or a fresh sign-in).
    SignedIn(AuthUser),
    /// Nobody is signed in. Always fires once shortly after subscribing
    /// when the backend has no session to restore.
    SignedOut,
}

impl AuthEvent {
    /// The identity carried by the event, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(user) => Some(&user.identity),
            Self::SignedOut => None,
        }
    }
}

/// Callback registered with [`AuthBackend::on_session_change`].
///
/// Backends may invoke it from any thread, zero or more times, until the
/// returned [`Subscription`] is cancelled.
pub type AuthListener = Box<dyn Fn(AuthEvent) + Send + Sync + 'static>;

/// Cancellation handle for a registered listener.
///
/// Cancelling is idempotent, and dropping the handle cancels it. Hold on
/// to it for as long as you want callbacks.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Wraps the function that unregisters the listener.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Unregisters the listener. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// `true` until [`cancel`](Self::cancel) runs.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Everything the session layer consumes from an identity provider.
///
/// # Example
///
/// ```rust
/// use eventide_session::{AuthBackend, AuthError, AuthEvent, AuthListener, Subscription};
/// use eventide_protocol::AuthUser;
///
/// /// A backend where nobody can ever sign in.
/// struct ClosedBackend;
///
/// impl AuthBackend for ClosedBackend {
///     fn on_session_change(&self, listener: AuthListener) -> Subscription {
///         listener(AuthEvent::SignedOut);
///         Subscription::noop()
///     }
///
///     async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
///         Err(AuthError::InvalidCredentials)
///     }
///
///     async fn sign_up(
///         &self,
///         _email: &str,
///         _password: &str,
///         _display_name: Option<&str>,
///     ) -> Result<AuthUser, AuthError> {
///         Err(AuthError::Network("sign-ups are closed".into()))
///     }
///
///     async fn sign_out(&self) -> Result<(), AuthError> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthBackend: Send + Sync + 'static {
    /// Registers `listener` for session-change events.
    ///
    /// The backend delivers the current state once after registration
    /// (usually asynchronously), then every change. Dropping or cancelling
    /// the returned handle stops delivery.
    fn on_session_change(&self, listener: AuthListener) -> Subscription;

    /// Signs in with email and password. On success the listener stream
    /// reports the user as well.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials`: bad email/password
    /// - `AuthError::Network`: backend unreachable
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, AuthError>> + Send;

    /// Creates an account and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<AuthUser, AuthError>> + Send;

    /// Ends the backend session. The listener stream reports `SignedOut`.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}
