//! An [`AuthBackend`] that keeps accounts in memory.
//!
//! Used by the dev demo and by tests. It behaves like a hosted identity
//! provider in the ways the session store cares about:
//!
//! - a new listener gets the current state once, asynchronously, after
//!   [`BackendConfig::initial_delay`]
//! - sign-in, sign-up, and sign-out push events to every listener
//! - the backend can be taken "offline" to simulate network failures

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventide_protocol::{AuthUser, Identity};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{AuthBackend, AuthError, AuthEvent, AuthListener, BackendConfig, Subscription};

type SharedListener = Arc<dyn Fn(AuthEvent) + Send + Sync + 'static>;

struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct BackendState {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    listeners: HashMap<u64, SharedListener>,
    offline: bool,
}

struct Inner {
    config: BackendConfig,
    state: Mutex<BackendState>,
    next_listener_id: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends `event` to every registered listener.
    ///
    /// Listeners are called after the lock is released: they are free to
    /// call back into the backend (or drop their subscription).
    fn emit(&self, event: AuthEvent) {
        let listeners: Vec<SharedListener> =
            self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    /// Sends the current state to listener `id`, if it's still registered.
    fn deliver_current(&self, id: u64) {
        let (listener, event) = {
            let state = self.lock();
            let Some(listener) = state.listeners.get(&id).cloned() else {
                // Unsubscribed before the first callback.
                return;
            };
            let event = match &state.current {
                Some(user) => AuthEvent::SignedIn(user.clone()),
                None => AuthEvent::SignedOut,
            };
            (listener, event)
        };
        tracing::trace!(listener_id = id, ?event, "delivering initial auth state");
        listener(event);
    }
}

/// In-memory identity provider. Cloning shares the same accounts.
#[derive(Clone)]
pub struct InMemoryAuthBackend {
    inner: Arc<Inner>,
}

impl InMemoryAuthBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(BackendState::default()),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// Registers an account without signing it in.
    ///
    /// # Errors
    /// Same as [`AuthBackend::sign_up`], minus the network check.
    pub fn add_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        if password.chars().count() < self.inner.config.min_password_len {
            return Err(AuthError::WeakPassword(
                self.inner.config.min_password_len,
            ));
        }
        let key = email.trim().to_ascii_lowercase();
        let mut state = self.inner.lock();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse(email.to_string()));
        }

        let mut identity = Identity::new(generate_uid(), email.trim());
        identity.display_name = display_name.map(str::to_string);
        let user = AuthUser::new(identity);

        state.accounts.insert(
            key,
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        tracing::info!(user_id = %user.identity.id, "account created");
        Ok(user)
    }

    /// Sets the `admin` claim on an account.
    ///
    /// Like custom claims on a hosted provider, the change is visible the
    /// next time the user signs in, not pushed to listeners.
    pub fn grant_admin(&self, email: &str) -> Result<(), AuthError> {
        let key = email.trim().to_ascii_lowercase();
        let mut state = self.inner.lock();
        let account = state
            .accounts
            .get_mut(&key)
            .ok_or_else(|| AuthError::UnknownAccount(email.to_string()))?;
        account.user.claims.admin = true;
        tracing::info!(user_id = %account.user.identity.id, "admin claim granted");
        Ok(())
    }

    /// While offline every call fails with [`AuthError::Network`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// The user the backend currently considers signed in.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.lock().current.clone()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn ensure_online(&self) -> Result<(), AuthError> {
        if self.inner.lock().offline {
            Err(AuthError::Network("auth backend unreachable".into()))
        } else {
            Ok(())
        }
    }

    fn set_current(&self, user: Option<AuthUser>) {
        self.inner.lock().current = user.clone();
        self.inner.emit(match user {
            Some(user) => AuthEvent::SignedIn(user),
            None => AuthEvent::SignedOut,
        });
    }
}

impl Default for InMemoryAuthBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl AuthBackend for InMemoryAuthBackend {
    fn on_session_change(&self, listener: AuthListener) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().listeners.insert(id, Arc::from(listener));

        // First callback: asynchronous on a runtime, immediate otherwise.
        // The pending task keeps the backend alive until it has delivered,
        // so dropping the caller's handle can't swallow the first event.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delay = self.inner.config.initial_delay;
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move {
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                    inner.deliver_current(id);
                });
            }
            Err(_) => self.inner.deliver_current(id),
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.remove(&id);
                tracing::trace!(listener_id = id, "auth listener removed");
            }
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.ensure_online()?;
        let key = email.trim().to_ascii_lowercase();
        let user = {
            let state = self.inner.lock();
            match state.accounts.get(&key) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        tracing::info!(user_id = %user.identity.id, "backend sign-in");
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        self.ensure_online()?;
        let user = self.add_account(email, password, display_name)?;
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.ensure_online()?;
        tracing::info!("backend sign-out");
        self.set_current(None);
        Ok(())
    }
}

/// Generates a 28-character alphanumeric user id.
fn generate_uid() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(28)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn recorder() -> (Arc<StdMutex<Vec<AuthEvent>>>, AuthListener) {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        (
            events,
            Box::new(move |e: AuthEvent| sink.lock().unwrap().push(e)),
        )
    }

    #[test]
    fn test_on_session_change_without_runtime_delivers_immediately() {
        let backend = InMemoryAuthBackend::default();
        let (events, listener) = recorder();
        let _sub = backend.on_session_change(listener);
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedOut]);
    }

    #[tokio::test]
    async fn test_on_session_change_delivers_after_delay() {
        tokio::time::pause();
        let backend = InMemoryAuthBackend::new(BackendConfig {
            initial_delay: Duration::from_millis(10),
            ..Default::default()
        });
        let (events, listener) = recorder();
        let _sub = backend.on_session_change(listener);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(events.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedOut]);
    }

    /// Lets spawned first-callback tasks run to completion.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test]
    async fn test_first_callback_survives_dropping_the_backend_handle() {
        let (events, listener) = recorder();
        let _sub = InMemoryAuthBackend::default().on_session_change(listener);
        settle().await;
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedOut]);
    }

    #[tokio::test]
    async fn test_cancel_before_first_callback_suppresses_it() {
        let backend = InMemoryAuthBackend::default();
        let (events, listener) = recorder();
        let mut sub = backend.on_session_change(listener);
        sub.cancel();
        settle().await;
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(backend.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_is_invalid_credentials() {
        let backend = InMemoryAuthBackend::default();
        backend.add_account("a@b.com", "secret1", None).unwrap();
        assert_eq!(
            backend.sign_in("a@b.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            backend.sign_in("who@b.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_sign_in_and_out_notify_listeners() {
        let backend = InMemoryAuthBackend::default();
        let created = backend.add_account("A@b.com", "secret1", Some("Ann")).unwrap();
        let (events, listener) = recorder();
        let _sub = backend.on_session_change(listener);
        settle().await;

        let user = backend.sign_in("a@B.com", "secret1").await.unwrap();
        assert_eq!(user, created);
        backend.sign_out().await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], AuthEvent::SignedIn(created));
        assert_eq!(events[2], AuthEvent::SignedOut);
        assert!(backend.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicates_and_short_passwords() {
        let backend = InMemoryAuthBackend::default();
        backend.sign_up("a@b.com", "secret1", None).await.unwrap();
        assert_eq!(
            backend.sign_up("A@B.COM", "secret2", None).await,
            Err(AuthError::EmailInUse("A@B.COM".into()))
        );
        assert_eq!(
            backend.sign_up("c@d.com", "123", None).await,
            Err(AuthError::WeakPassword(6))
        );
    }

    #[tokio::test]
    async fn test_offline_backend_fails_with_network_error() {
        let backend = InMemoryAuthBackend::default();
        backend.add_account("a@b.com", "secret1", None).unwrap();
        backend.set_offline(true);
        assert!(matches!(
            backend.sign_in("a@b.com", "secret1").await,
            Err(AuthError::Network(_))
        ));
        backend.set_offline(false);
        assert!(backend.sign_in("a@b.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_grant_admin_applies_on_next_sign_in() {
        let backend = InMemoryAuthBackend::default();
        backend.add_account("boss@b.com", "secret1", None).unwrap();
        backend.grant_admin("boss@b.com").unwrap();
        let user = backend.sign_in("boss@b.com", "secret1").await.unwrap();
        assert!(user.claims.admin);
        assert!(matches!(
            backend.grant_admin("ghost@b.com"),
            Err(AuthError::UnknownAccount(_))
        ));
    }

    #[test]
    fn test_generate_uid_is_28_alphanumeric_chars() {
        let uid = generate_uid();
        assert_eq!(uid.len(), 28);
        assert!(uid.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
