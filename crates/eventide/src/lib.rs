//! # Eventide
//!
//! Client core for the Eventide event-ticketing app.
//!
//! The centrepiece is the session store in [`eventide_session`]: it merges a
//! live authentication backend with a locally persisted developer override
//! into one session everything else reads. Around it sit the event catalog,
//! the watchlist, and persisted bookings from [`eventide_catalog`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eventide::prelude::*;
//!
//! # async fn run() -> Result<(), EventideError> {
//! eventide::init_tracing("info");
//!
//! let storage = FileStore::open("./eventide-data")?;
//! let app = EventideApp::builder(storage).build(InMemoryAuthBackend::default());
//! app.mount()?;
//!
//! app.log_in("devadmin@eventide.com", "devpassword").await?;
//! assert_eq!(app.admin_access(), AccessDecision::Granted);
//! # Ok(())
//! # }
//! ```

mod app;
mod error;

pub use app::{EventideApp, EventideAppBuilder};
pub use error::EventideError;

/// Installs a `tracing` subscriber that honours `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"` or `"eventide_session=debug"`).
///
/// Meant for binaries. Does nothing if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Everything an app needs in one import.
pub mod prelude {
    pub use crate::{EventideApp, EventideAppBuilder, EventideError};
    pub use eventide_catalog::{
        Bookings, BookingsConfig, CatalogError, Event, EventCatalog, EventDraft, EventId,
        FieldError, Watchlist,
    };
    pub use eventide_protocol::{
        AuthUser, Claims, Codec, Identity, JsonCodec, OverrideRecord, Session, SessionSnapshot,
        SourceKind, UserId,
    };
    pub use eventide_session::{
        AccessDecision, AdminEmailPolicy, AdminPolicy, AuthBackend, AuthError, AuthEvent,
        BackendConfig, ClaimsPolicy, InMemoryAuthBackend, LoginConfig, LoginOutcome,
        SessionError, SessionStore, StoreConfig, Subscription, admin_access, login,
    };
    pub use eventide_storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
}
