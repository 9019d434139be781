//! Core session types shared by every Eventide layer.
//!
//! These are the values that get persisted, handed to listeners, and
//! compared when deciding whether anything actually changed. Field names
//! are serialized in camelCase so records written by the browser build of
//! the app (`isAdmin`, `displayName`) decode unchanged.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user, as issued by the authentication backend
/// (or invented by a developer login).
///
/// Newtype wrapper over `String`: you can't pass an email where a user id
/// is expected, and `#[serde(transparent)]` keeps the JSON form a plain
/// string (`"u1"`, not `{ "0": "u1" }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a `UserId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a user is: the minimal record the rest of the app needs.
///
/// `display_name` is optional because backends don't always have one
/// (an account created with email + password has none until the user
/// sets it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Backend-issued user id.
    pub id: UserId,
    /// The email address the user signed in with.
    pub email: String,
    /// Human-readable name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    /// Creates an identity without a display name.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            email: email.into(),
            display_name: None,
        }
    }

    /// Sets the display name (builder style).
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Claims the authentication backend attaches to a signed-in user.
///
/// Whether a user is an administrator is decided by the backend (custom
/// claims) or by an explicit policy, never by string-matching inside the
/// session store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The backend granted this user administrative rights.
    #[serde(default)]
    pub admin: bool,
}

/// A user as reported by the live authentication backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub identity: Identity,
    #[serde(default)]
    pub claims: Claims,
}

impl AuthUser {
    /// Creates a user with default (non-admin) claims.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            claims: Claims::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Which mechanism currently supplies the session.
///
/// ```text
///            set_override(Some)          live SignedIn
///   None ─────────────────────→ Override ─────────────→ Live
///     ↑                            │                     │
///     └──── set_override(None) ────┘                     │
///     └──────────── live SignedOut (no override) ────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum SourceKind {
    /// Nobody is signed in.
    #[default]
    None,
    /// The session comes from the live authentication stream.
    Live,
    /// The session was injected manually and persisted locally.
    Override,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Live => write!(f, "live"),
            Self::Override => write!(f, "override"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// "Who is using the app right now."
///
/// Fields are private so the three constructors are the only way to build
/// one: a signed-out session never carries an admin flag, and the source
/// always agrees with whether an identity is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
    is_admin: bool,
    source: SourceKind,
}

impl Session {
    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A session delivered by the live authentication stream.
    pub fn live(identity: Identity, is_admin: bool) -> Self {
        Self {
            identity: Some(identity),
            is_admin,
            source: SourceKind::Live,
        }
    }

    /// A session taken from an override record.
    pub fn overridden(record: OverrideRecord) -> Self {
        Self {
            identity: Some(record.identity),
            is_admin: record.is_admin,
            source: SourceKind::Override,
        }
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// `true` only when someone is signed in AND they are an admin.
    pub fn is_admin(&self) -> bool {
        self.identity.is_some() && self.is_admin
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

/// The `{session, loading}` pair the store publishes to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Session,
    /// `true` until the store has resolved a session for the first time.
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            session: Session::signed_out(),
            loading: true,
        }
    }
}

// ---------------------------------------------------------------------------
// OverrideRecord
// ---------------------------------------------------------------------------

/// The persisted form of a manually injected session.
///
/// At most one of these exists in storage at a time, under a single
/// well-known key. In JSON:
///
/// ```json
/// {"identity":{"id":"u1","email":"a@b.com"},"isAdmin":true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub identity: Identity,
    #[serde(default)]
    pub is_admin: bool,
}

impl OverrideRecord {
    pub fn new(identity: Identity, is_admin: bool) -> Self {
        Self { identity, is_admin }
    }

    /// Checks the fields serde can't: identity id and email must be
    /// non-empty.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidRecord`] naming the empty field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.identity.id.as_str().trim().is_empty() {
            return Err(ProtocolError::InvalidRecord(
                "identity id is empty".into(),
            ));
        }
        if self.identity.email.trim().is_empty() {
            return Err(ProtocolError::InvalidRecord(
                "identity email is empty".into(),
            ));
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
