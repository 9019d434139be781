//! Login, sign-up, and logout flows on top of the session store.
//!
//! These are what the UI's forms call. They validate input, route
//! developer credentials to an override, and send everything else to the
//! backend, whose listener stream then updates the store.

use std::sync::LazyLock;

use eventide_protocol::{AuthUser, Codec, Identity, OverrideRecord};
use eventide_storage::KeyValueStore;
use regex::Regex;

use crate::{AuthBackend, LoginConfig, SessionError, SessionStore};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// User id assigned to the developer admin override.
pub const DEV_ADMIN_UID: &str = "dev-admin-uid";
/// User id assigned to the developer user override.
pub const DEV_USER_UID: &str = "dev-user-uid";

/// How a successful login was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Developer credentials: an override session was injected.
    Override(OverrideRecord),
    /// The backend accepted the credentials.
    Live(AuthUser),
}

/// Returns `true` if `email` looks like an address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn validate_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    if !is_valid_email(email) {
        return Err(SessionError::InvalidInput("invalid email address".into()));
    }
    if password.is_empty() {
        return Err(SessionError::InvalidInput("password is required".into()));
    }
    Ok(())
}

/// Matches developer credentials to the override they stand for.
fn dev_override(config: &LoginConfig, email: &str, password: &str) -> Option<OverrideRecord> {
    if !config.enable_dev_logins || password != config.dev_password {
        return None;
    }
    let email = email.trim();
    if email.eq_ignore_ascii_case(&config.dev_admin_email) {
        Some(OverrideRecord::new(
            Identity::new(DEV_ADMIN_UID, &config.dev_admin_email)
                .with_display_name("Dev Admin (Local)"),
            true,
        ))
    } else if email.eq_ignore_ascii_case(&config.dev_user_email) {
        Some(OverrideRecord::new(
            Identity::new(DEV_USER_UID, &config.dev_user_email)
                .with_display_name("Dev User (Local)"),
            false,
        ))
    } else {
        None
    }
}

/// Logs in with email and password.
///
/// Developer credentials inject an override (a failure to persist it is
/// logged by the store and doesn't fail the login). Anything else goes to
/// `backend.sign_in`.
///
/// # Errors
/// - [`SessionError::InvalidInput`]: malformed email or empty password
/// - [`SessionError::Auth`]: the backend rejected the credentials
/// - [`SessionError::Disposed`]: the store is gone
pub async fn log_in<S, C, B>(
    store: &SessionStore<S, C>,
    backend: &B,
    config: &LoginConfig,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, SessionError>
where
    S: KeyValueStore,
    C: Codec,
    B: AuthBackend,
{
    validate_credentials(email, password)?;

    if let Some(record) = dev_override(config, email, password) {
        match store.set_override(Some(record.identity.clone()), record.is_admin) {
            Ok(()) | Err(SessionError::StorageWrite(_)) => {}
            Err(e) => return Err(e),
        }
        return Ok(LoginOutcome::Override(record));
    }

    let user = backend.sign_in(email.trim(), password).await?;
    Ok(LoginOutcome::Live(user))
}

/// Creates an account through the backend, which also signs it in.
///
/// # Errors
/// - [`SessionError::InvalidInput`]: malformed email or empty password
/// - [`SessionError::Auth`]: email in use, weak password, network
pub async fn sign_up<B: AuthBackend>(
    backend: &B,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<AuthUser, SessionError> {
    validate_credentials(email, password)?;
    let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
    Ok(backend.sign_up(email.trim(), password, display_name).await?)
}

/// Signs out of the backend and clears any override.
///
/// The override is cleared even if the backend call fails, so the local
/// app is signed out either way; the backend error is then returned.
pub async fn log_out<S, C, B>(store: &SessionStore<S, C>, backend: &B) -> Result<(), SessionError>
where
    S: KeyValueStore,
    C: Codec,
    B: AuthBackend,
{
    let backend_result = backend.sign_out().await;
    if let Err(e) = &backend_result {
        tracing::warn!(error = %e, "backend sign-out failed");
    }
    match store.set_override(None, false) {
        Ok(()) | Err(SessionError::StorageWrite(_)) => {}
        Err(e) => return Err(e),
    }
    backend_result.map_err(SessionError::from)
}
