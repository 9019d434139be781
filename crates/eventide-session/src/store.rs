//! The session store: one observable session reconciled from two sources.
//!
//! The store merges
//!
//! - the **live** stream from an [`AuthBackend`], and
//! - a locally persisted **override** record injected with
//!   [`SessionStore::set_override`] (developer logins, logout)
//!
//! into a single [`SessionSnapshot`]. Precedence:
//!
//! 1. An explicit `set_override` call always applies.
//! 2. A live event carrying an identity replaces the session and deletes
//!    any stored override.
//! 3. A live "signed out" event is ignored while an override is active;
//!    otherwise it signs the session out.
//!
//! Rules are evaluated at each arrival against what is true right then, so
//! the outcome doesn't depend on whether the override load or the first
//! live event happens first.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──→ mount(backend) ──→ ... set_override / live events ... ──→ dispose()
//! [Initial, loading]   │
//!                      ├─ override in storage → [Override-active]
//!                      └─ first live event    → [Live-active] / [Signed-out]
//! ```
//!
//! `loading` starts `true` and flips to `false` the first time a session is
//! resolved. It never goes back.
//!
//! # Concurrency note
//!
//! State lives behind a `std::sync::Mutex` because live callbacks are plain
//! synchronous closures that may run on any Tokio worker. Storage writes
//! and the in-memory update happen under the same lock, so no subscriber
//! ever sees one without the other. Listeners run after the lock is
//! released and may call back into the store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventide_protocol::{
    Codec, Identity, JsonCodec, OverrideRecord, Session, SessionSnapshot, SourceKind,
};
use eventide_storage::KeyValueStore;
use tokio::sync::watch;

use crate::{
    AdminPolicy, AuthBackend, AuthEvent, ClaimsPolicy, RecordError, SessionError, StoreConfig,
    Subscription,
};

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Disposed,
}

struct StoreState {
    current: SessionSnapshot,
    /// Last value handed to listeners; used to skip no-op notifications.
    published: SessionSnapshot,
    lifecycle: Lifecycle,
    live_subscription: Option<Subscription>,
    listeners: Vec<(u64, Listener)>,
    /// Snapshots waiting to be delivered, oldest first.
    pending: VecDeque<SessionSnapshot>,
    dispatching: bool,
}

struct Shared<S, C> {
    storage: S,
    codec: C,
    config: StoreConfig,
    policy: Box<dyn AdminPolicy>,
    state: Mutex<StoreState>,
    watch_tx: watch::Sender<SessionSnapshot>,
    next_listener_id: AtomicU64,
}

/// The session reconciliation store.
///
/// Cheap to clone; every clone is the same store. Create one per app
/// session and hand clones to whatever needs the current user.
pub struct SessionStore<S: KeyValueStore, C: Codec = JsonCodec> {
    shared: Arc<Shared<S, C>>,
}

impl<S: KeyValueStore, C: Codec> Clone for SessionStore<S, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionStore`] when the defaults (JSON, [`ClaimsPolicy`])
/// don't fit.
pub struct SessionStoreBuilder<S, C = JsonCodec> {
    storage: S,
    codec: C,
    config: StoreConfig,
    policy: Box<dyn AdminPolicy>,
}

impl<S: KeyValueStore> SessionStoreBuilder<S> {
    fn new(storage: S) -> Self {
        Self {
            storage,
            codec: JsonCodec,
            config: StoreConfig::default(),
            policy: Box::new(ClaimsPolicy),
        }
    }
}

impl<S: KeyValueStore, C: Codec> SessionStoreBuilder<S, C> {
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the policy used to decide admin rights for live users.
    pub fn policy(mut self, policy: impl AdminPolicy) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Swaps the codec used for the override record.
    pub fn codec<C2: Codec>(self, codec: C2) -> SessionStoreBuilder<S, C2> {
        SessionStoreBuilder {
            storage: self.storage,
            codec,
            config: self.config,
            policy: self.policy,
        }
    }

    pub fn build(self) -> SessionStore<S, C> {
        let initial = SessionSnapshot::default();
        let (watch_tx, _) = watch::channel(initial.clone());
        SessionStore {
            shared: Arc::new(Shared {
                storage: self.storage,
                codec: self.codec,
                config: self.config,
                policy: self.policy,
                state: Mutex::new(StoreState {
                    current: initial.clone(),
                    published: initial,
                    lifecycle: Lifecycle::Created,
                    live_subscription: None,
                    listeners: Vec::new(),
                    pending: VecDeque::new(),
                    dispatching: false,
                }),
                watch_tx,
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl<S: KeyValueStore> SessionStore<S> {
    /// Creates a store in the Initial state (`loading`, signed out).
    ///
    /// Nothing is read and nothing is subscribed until [`mount`](Self::mount).
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self::builder(storage).config(config).build()
    }

    pub fn builder(storage: S) -> SessionStoreBuilder<S> {
        SessionStoreBuilder::new(storage)
    }
}

impl<S: KeyValueStore, C: Codec> SessionStore<S, C> {
    /// Loads any persisted override, then subscribes to `backend`.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyMounted`]: called twice
    /// - [`SessionError::Disposed`]: called after [`dispose`](Self::dispose)
    pub fn mount<B: AuthBackend>(&self, backend: &B) -> Result<(), SessionError> {
        {
            let mut state = self.shared.lock();
            match state.lifecycle {
                Lifecycle::Created => state.lifecycle = Lifecycle::Mounted,
                Lifecycle::Mounted => return Err(SessionError::AlreadyMounted),
                Lifecycle::Disposed => return Err(SessionError::Disposed),
            }

            // Step 1: restore the override, if there is one.
            if let Some(record) = self.shared.read_override() {
                tracing::info!(
                    user_id = %record.identity.id,
                    is_admin = record.is_admin,
                    "session override restored from storage"
                );
                state.current = resolved(Session::overridden(record));
                self.shared.publish(state);
            }
        }

        // Step 2: subscribe. The backend may call back before
        // `on_session_change` even returns, so no lock is held here.
        let weak = Arc::downgrade(&self.shared);
        let subscription = backend.on_session_change(Box::new(move |event: AuthEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_live_event(event);
            }
        }));

        let mut state = self.shared.lock();
        if state.lifecycle == Lifecycle::Disposed {
            // Disposed while we were subscribing: let the handle drop
            // (and cancel) outside the lock.
            drop(state);
            drop(subscription);
            return Ok(());
        }
        state.live_subscription = Some(subscription);
        tracing::info!("session store mounted");
        Ok(())
    }

    /// Unsubscribes from the live stream. Idempotent.
    ///
    /// Live events that are already in flight are ignored once this
    /// returns. Reads keep working; `set_override` and `mount` return
    /// [`SessionError::Disposed`].
    pub fn dispose(&self) {
        let subscription = {
            let mut state = self.shared.lock();
            if state.lifecycle == Lifecycle::Disposed {
                return;
            }
            state.lifecycle = Lifecycle::Disposed;
            state.live_subscription.take()
        };
        if let Some(mut subscription) = subscription {
            subscription.cancel();
        }
        tracing::info!("session store disposed");
    }

    /// The current session. Signed out means `source() == SourceKind::None`.
    pub fn get_session(&self) -> Session {
        self.shared.lock().current.session.clone()
    }

    /// `true` until the first session is resolved.
    pub fn is_loading(&self) -> bool {
        self.shared.lock().current.loading
    }

    /// Both values, read atomically.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().current.clone()
    }

    /// Registers `listener` for every resolved change, delivered in order.
    ///
    /// The listener gets the new snapshot as an argument and may call back
    /// into the store (including `set_override`); such nested updates are
    /// delivered after the current one finishes. Drop or cancel the
    /// returned handle to unsubscribe.
    ///
    /// A listener that captures a clone of this store keeps it alive until
    /// the subscription is cancelled.
    pub fn subscribe(
        &self,
        listener: impl Fn(&SessionSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.shared.lock().listeners.push((id, Arc::new(listener)));

        let weak = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                let removed = {
                    let mut state = shared.lock();
                    state
                        .listeners
                        .iter()
                        .position(|(lid, _)| *lid == id)
                        .map(|idx| state.listeners.remove(idx))
                };
                // Dropped outside the lock: the closure may own things
                // whose destructors touch the store.
                drop(removed);
            }
        })
    }

    /// A `watch` receiver for async consumers. Intermediate values may be
    /// skipped; the latest one is always observed.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.watch_tx.subscribe()
    }

    /// Injects (`Some`) or clears (`None`) the override session.
    ///
    /// The in-memory session and `loading = false` are applied and
    /// published no matter what happens in storage.
    ///
    /// # Errors
    /// - [`SessionError::StorageWrite`]: persisting failed; the session is
    ///   still updated in memory
    /// - [`SessionError::Disposed`]: the store is disposed; nothing changed
    pub fn set_override(
        &self,
        identity: Option<Identity>,
        is_admin: bool,
    ) -> Result<(), SessionError> {
        let mut state = self.shared.lock();
        if state.lifecycle == Lifecycle::Disposed {
            return Err(SessionError::Disposed);
        }

        let (session, persisted) = match identity {
            Some(identity) => {
                let record = OverrideRecord::new(identity, is_admin);
                let persisted = self.shared.write_override(&record);
                tracing::info!(
                    user_id = %record.identity.id,
                    is_admin,
                    "session override set"
                );
                (Session::overridden(record), persisted)
            }
            None => {
                tracing::info!("session override cleared");
                (Session::signed_out(), self.shared.clear_override())
            }
        };

        state.current = resolved(session);
        self.shared.publish(state);
        persisted
    }
}

impl<S: KeyValueStore, C: Codec> std::fmt::Debug for SessionStore<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("SessionStore")
            .field("session", &state.current.session)
            .field("loading", &state.current.loading)
            .field("lifecycle", &state.lifecycle)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

fn resolved(session: Session) -> SessionSnapshot {
    SessionSnapshot {
        session,
        loading: false,
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

impl<S: KeyValueStore, C: Codec> Shared<S, C> {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_live_event(&self, event: AuthEvent) {
        let mut state = self.lock();
        if state.lifecycle != Lifecycle::Mounted {
            tracing::debug!("live auth event after dispose ignored");
            return;
        }

        match event {
            AuthEvent::SignedIn(user) => {
                // A genuine sign-in supersedes any manual override. A
                // failed removal is logged inside and doesn't change that.
                let _ = self.clear_override();
                let is_admin = self.policy.is_admin(&user);
                tracing::info!(
                    user_id = %user.identity.id,
                    is_admin,
                    "live session signed in"
                );
                state.current = resolved(Session::live(user.identity, is_admin));
            }
            AuthEvent::SignedOut => {
                let override_in_memory = state.current.session.source() == SourceKind::Override;
                if override_in_memory || self.read_override().is_some() {
                    tracing::debug!("live sign-out ignored while an override is active");
                    return;
                }
                tracing::info!("live session signed out");
                state.current = resolved(Session::signed_out());
            }
        }
        self.publish(state);
    }

    /// Reads the override record. Any failure counts as "no override".
    fn read_override(&self) -> Option<OverrideRecord> {
        match self.try_read_override() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    key = %self.config.override_key,
                    error = &e as &dyn std::error::Error,
                    "override record unreadable, treating as absent"
                );
                None
            }
        }
    }

    fn try_read_override(&self) -> Result<Option<OverrideRecord>, SessionError> {
        let key = &self.config.override_key;
        let Some(bytes) = self
            .storage
            .get(key)
            .map_err(|e| SessionError::StorageRead(e.into()))?
        else {
            return Ok(None);
        };
        let record: OverrideRecord = self
            .codec
            .decode(&bytes)
            .map_err(|e| SessionError::StorageRead(e.into()))?;
        record
            .validate()
            .map_err(|e| SessionError::StorageRead(e.into()))?;
        Ok(Some(record))
    }

    fn write_override(&self, record: &OverrideRecord) -> Result<(), SessionError> {
        let result = self
            .codec
            .encode(record)
            .map_err(RecordError::from)
            .and_then(|bytes| {
                self.storage
                    .set(&self.config.override_key, &bytes)
                    .map_err(RecordError::from)
            });
        result.map_err(|e| {
            tracing::warn!(
                key = %self.config.override_key,
                error = &e as &dyn std::error::Error,
                "failed to persist session override, keeping it in memory"
            );
            SessionError::StorageWrite(e)
        })
    }

    fn clear_override(&self) -> Result<(), SessionError> {
        self.storage
            .remove(&self.config.override_key)
            .map_err(|e| {
                tracing::warn!(
                    key = %self.config.override_key,
                    error = &e as &dyn std::error::Error,
                    "failed to remove session override"
                );
                SessionError::StorageWrite(e.into())
            })
    }

    /// Publishes `state.current` if it differs from what listeners last saw.
    ///
    /// Consumes the guard: listeners are invoked with the lock released.
    /// If another thread (or a listener) is already dispatching, the
    /// snapshot is queued and delivered by that dispatcher, which keeps
    /// notifications in FIFO order.
    fn publish<'a>(&'a self, mut state: MutexGuard<'a, StoreState>) {
        if state.current == state.published {
            return;
        }
        let snapshot = state.current.clone();
        state.published = snapshot.clone();
        self.watch_tx.send_replace(snapshot.clone());
        state.pending.push_back(snapshot);

        if state.dispatching {
            return;
        }
        state.dispatching = true;

        loop {
            let Some(next) = state.pending.pop_front() else {
                state.dispatching = false;
                return;
            };
            let listeners: Vec<Listener> =
                state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            drop(state);

            for listener in &listeners {
                listener(&next);
            }
            state = self.lock();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
