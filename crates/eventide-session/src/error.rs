//! Error types for the session layer.

use eventide_protocol::ProtocolError;
use eventide_storage::StorageError;

/// Why an override record couldn't be read or written.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Codec(#[from] ProtocolError),
}

/// Errors that can occur in the session layer.
///
/// None of these ever escape the live listener: the store recovers from
/// storage failures locally and logs them. They surface only as return
/// values of the imperative API so the UI can decide what to show.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The persisted override record is unreadable or corrupted. The store
    /// treats it as absent.
    #[error("failed to read session override")]
    StorageRead(#[source] RecordError),

    /// The override could not be persisted (or removed). The in-memory
    /// session was still updated.
    #[error("failed to persist session override")]
    StorageWrite(#[source] RecordError),

    /// `mount()` was called on a store that is already mounted.
    #[error("session store is already mounted")]
    AlreadyMounted,

    /// The store has been disposed and no longer accepts calls.
    #[error("session store has been disposed")]
    Disposed,

    /// The authentication backend rejected the request.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Login or sign-up input failed validation before reaching the
    /// backend.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The signed-in user lacks admin rights.
    #[error("admin rights required")]
    Forbidden,
}

/// Errors reported by an [`AuthBackend`](crate::AuthBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Wrong email or password. Deliberately doesn't say which.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("an account already exists for {0}")]
    EmailInUse(String),

    /// Sign-up with a password the backend won't accept.
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    /// No account exists for the given email.
    #[error("no account for {0}")]
    UnknownAccount(String),

    /// The backend couldn't be reached.
    #[error("network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_storage_write_reports_cause_once() {
        let err = SessionError::StorageWrite(StorageError::Unavailable("quota exceeded".into()).into());

        assert_eq!(err.to_string(), "failed to persist session override");
        let cause = err.source().expect("storage cause");
        assert_eq!(cause.to_string(), "storage unavailable: quota exceeded");
    }

    #[test]
    fn test_storage_read_keeps_codec_error_as_source() {
        let err = SessionError::StorageRead(ProtocolError::InvalidRecord("empty id".into()).into());

        assert!(!err.to_string().contains("empty id"));
        assert!(err.source().unwrap().to_string().contains("empty id"));
    }
}
