//! Access checks for admin-only areas.

use eventide_protocol::{Identity, Session, SessionSnapshot};

use crate::SessionError;

/// What the admin area should do with the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Still resolving; show a spinner, decide later.
    Pending,
    /// Nobody is signed in; send them to the login page.
    RedirectToLogin,
    /// Signed in without admin rights.
    Denied,
    Granted,
}

/// Decides access to the admin area.
pub fn admin_access(snapshot: &SessionSnapshot) -> AccessDecision {
    if snapshot.loading {
        AccessDecision::Pending
    } else if !snapshot.session.is_signed_in() {
        AccessDecision::RedirectToLogin
    } else if !snapshot.session.is_admin() {
        AccessDecision::Denied
    } else {
        AccessDecision::Granted
    }
}

/// Returns the admin's identity, or why there isn't one.
///
/// # Errors
/// - [`SessionError::NotSignedIn`]
/// - [`SessionError::Forbidden`]: signed in, not an admin
pub fn require_admin(session: &Session) -> Result<&Identity, SessionError> {
    let identity = session.identity().ok_or(SessionError::NotSignedIn)?;
    if session.is_admin() {
        Ok(identity)
    } else {
        Err(SessionError::Forbidden)
    }
}
