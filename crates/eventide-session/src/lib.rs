//! Session management for Eventide.
//!
//! This crate answers "who is using the app right now":
//!
//! 1. **Reconciliation**: [`SessionStore`] merges the live backend stream
//!    with a persisted override into one observable session
//! 2. **Authentication**: the [`AuthBackend`] capability, plus
//!    [`InMemoryAuthBackend`] for development and tests
//! 3. **Flows**: [`login`] (dev logins, sign-up, logout) and [`guard`]
//!    (admin-area access)
//!
//! # How it fits in the stack
//!
//! ```text
//! UI / catalog (above)  ← reads sessions, calls login flows
//!     ↕
//! Session layer (this crate)  ← reconciles live vs override
//!     ↕
//! Protocol + storage (below)  ← session types, override bytes on disk
//! ```

mod backend;
mod config;
mod error;
pub mod guard;
pub mod login;
mod memory;
mod policy;
mod store;

pub use backend::{AuthBackend, AuthEvent, AuthListener, Subscription};
pub use config::{BackendConfig, LoginConfig, StoreConfig};
pub use error::{AuthError, RecordError, SessionError};
pub use guard::{AccessDecision, admin_access, require_admin};
pub use login::LoginOutcome;
pub use memory::InMemoryAuthBackend;
pub use policy::{AdminEmailPolicy, AdminPolicy, ClaimsPolicy};
pub use store::{SessionStore, SessionStoreBuilder};
