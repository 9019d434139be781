//! Deciding whether a live user is an administrator.
//!
//! The store asks an [`AdminPolicy`] once per live sign-in event. Override
//! sessions carry their own admin flag and never consult the policy.

use std::collections::HashSet;

use eventide_protocol::AuthUser;

/// Decides admin rights for a user reported by the live backend.
pub trait AdminPolicy: Send + Sync + 'static {
    fn is_admin(&self, user: &AuthUser) -> bool;
}

/// Trusts the backend's `admin` claim. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsPolicy;

impl AdminPolicy for ClaimsPolicy {
    fn is_admin(&self, user: &AuthUser) -> bool {
        user.claims.admin
    }
}

/// Grants admin to an explicit allow-list of emails, in addition to
/// anyone carrying the backend's `admin` claim.
///
/// Emails are compared case-insensitively and must match exactly.
#[derive(Debug, Clone, Default)]
pub struct AdminEmailPolicy {
    emails: HashSet<String>,
}

impl AdminEmailPolicy {
    pub fn new<I, E>(emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl AdminPolicy for AdminEmailPolicy {
    fn is_admin(&self, user: &AuthUser) -> bool {
        user.claims.admin
            || self
                .emails
                .contains(&user.identity.email.trim().to_ascii_lowercase())
    }
}

impl<F> AdminPolicy for F
where
    F: Fn(&AuthUser) -> bool + Send + Sync + 'static,
{
    fn is_admin(&self, user: &AuthUser) -> bool {
        self(user)
    }
}
