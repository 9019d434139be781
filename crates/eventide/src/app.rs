//! `EventideApp` builder and the app handle.
//!
//! This ties the layers together: storage → session store → catalog,
//! bookings, and watchlist, with one auth backend feeding the session.

use eventide_catalog::{
    Bookings, BookingsConfig, Event, EventCatalog, EventDraft, EventId, Watchlist,
};
use eventide_protocol::{AuthUser, SessionSnapshot};
use eventide_session::{
    AccessDecision, AdminPolicy, AuthBackend, InMemoryAuthBackend, LoginConfig, LoginOutcome,
    SessionStore, SessionStoreBuilder, StoreConfig, admin_access, login,
};
use eventide_storage::KeyValueStore;

use crate::EventideError;

/// Builder for an [`EventideApp`].
///
/// # Example
///
/// ```rust
/// use eventide::prelude::*;
///
/// let app = EventideApp::builder(MemoryStore::new())
///     .login_config(LoginConfig {
///         enable_dev_logins: false,
///         ..Default::default()
///     })
///     .build(InMemoryAuthBackend::default());
/// assert!(app.snapshot().loading);
/// ```
pub struct EventideAppBuilder<S: KeyValueStore + Clone> {
    storage: S,
    session: SessionStoreBuilder<S>,
    login_config: LoginConfig,
    bookings_config: BookingsConfig,
}

impl<S: KeyValueStore + Clone> EventideAppBuilder<S> {
    /// Creates a builder with default settings over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            session: SessionStore::builder(storage.clone()),
            storage,
            login_config: LoginConfig::default(),
            bookings_config: BookingsConfig::default(),
        }
    }

    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.session = self.session.config(config);
        self
    }

    pub fn login_config(mut self, config: LoginConfig) -> Self {
        self.login_config = config;
        self
    }

    pub fn bookings_config(mut self, config: BookingsConfig) -> Self {
        self.bookings_config = config;
        self
    }

    /// Sets how live identities are judged admin.
    pub fn policy(mut self, policy: impl AdminPolicy) -> Self {
        self.session = self.session.policy(policy);
        self
    }

    /// Builds the app around `backend`. Bookings are loaded now; the
    /// session isn't resolved until [`EventideApp::mount`].
    pub fn build<B: AuthBackend>(self, backend: B) -> EventideApp<S, B> {
        EventideApp {
            session: self.session.build(),
            bookings: Bookings::load(self.storage, self.bookings_config),
            backend,
            login_config: self.login_config,
            catalog: EventCatalog::new(),
            watchlist: Watchlist::new(),
        }
    }
}

/// A running Eventide client.
pub struct EventideApp<S: KeyValueStore, B: AuthBackend = InMemoryAuthBackend> {
    session: SessionStore<S>,
    backend: B,
    login_config: LoginConfig,
    catalog: EventCatalog,
    watchlist: Watchlist,
    bookings: Bookings<S>,
}

impl<S: KeyValueStore + Clone> EventideApp<S> {
    /// Creates a builder.
    pub fn builder(storage: S) -> EventideAppBuilder<S> {
        EventideAppBuilder::new(storage)
    }
}

impl<S: KeyValueStore, B: AuthBackend> EventideApp<S, B> {
    /// Loads any saved override and starts listening to the backend.
    pub fn mount(&self) -> Result<(), EventideError> {
        self.session.mount(&self.backend)?;
        tracing::info!("eventide app mounted");
        Ok(())
    }

    /// Stops listening to the backend. Idempotent.
    pub fn dispose(&self) {
        self.session.dispose();
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Whether the admin area should open right now.
    pub fn admin_access(&self) -> AccessDecision {
        admin_access(&self.session.snapshot())
    }

    pub async fn log_in(&self, email: &str, password: &str) -> Result<LoginOutcome, EventideError> {
        Ok(login::log_in(&self.session, &self.backend, &self.login_config, email, password).await?)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, EventideError> {
        Ok(login::sign_up(&self.backend, email, password, display_name).await?)
    }

    pub async fn log_out(&self) -> Result<(), EventideError> {
        Ok(login::log_out(&self.session, &self.backend).await?)
    }

    /// Publishes `draft` as the current user. Admins only.
    pub fn publish_event(&mut self, draft: EventDraft) -> Result<Event, EventideError> {
        let session = self.session.get_session();
        Ok(self.catalog.add_event(&session, draft)?)
    }

    /// Removes an event as the current user. Admins only.
    pub fn unpublish_event(&mut self, id: &EventId) -> Result<Event, EventideError> {
        let session = self.session.get_session();
        Ok(self.catalog.remove(&session, id)?)
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn watchlist_mut(&mut self) -> &mut Watchlist {
        &mut self.watchlist
    }

    pub fn bookings(&self) -> &Bookings<S> {
        &self.bookings
    }

    pub fn bookings_mut(&mut self) -> &mut Bookings<S> {
        &mut self.bookings
    }
}
