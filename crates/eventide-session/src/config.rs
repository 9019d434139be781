//! Configuration for the session layer.
//!
//! Every struct has a `Default` with the values the app ships with; build
//! one with `..Default::default()` and override only what you need.

use std::time::Duration;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Configuration for [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Storage key reserved for the override record.
    ///
    /// Default: `"eventide-mock-auth"`.
    pub override_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            override_key: "eventide-mock-auth".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Configuration for [`InMemoryAuthBackend`](crate::InMemoryAuthBackend).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// How long after registration a listener receives its first
    /// "current state" event. Models the round-trip a real backend makes
    /// before it knows whether a session can be restored.
    ///
    /// Default: zero (still delivered asynchronously when a Tokio runtime
    /// is running).
    pub initial_delay: Duration,

    /// Minimum password length accepted by sign-up.
    ///
    /// Default: 6.
    pub min_password_len: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            min_password_len: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// LoginConfig
// ---------------------------------------------------------------------------

/// Configuration for the login flow in [`login`](crate::login).
///
/// The developer credentials bypass the backend entirely and inject an
/// override session. Turn them off in anything that faces real users.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Email that logs in as the developer admin.
    pub dev_admin_email: String,
    /// Email that logs in as the developer (non-admin) user.
    pub dev_user_email: String,
    /// Password shared by both developer accounts.
    pub dev_password: String,
    /// Whether developer logins are recognised at all.
    pub enable_dev_logins: bool,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            dev_admin_email: "devadmin@eventide.com".to_string(),
            dev_user_email: "devuser@eventide.com".to_string(),
            dev_password: "devpassword".to_string(),
            enable_dev_logins: true,
        }
    }
}
