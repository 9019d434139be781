//! Unified error type for Eventide.

use eventide_catalog::CatalogError;
use eventide_protocol::ProtocolError;
use eventide_session::{AuthError, SessionError};
use eventide_storage::StorageError;

/// Top-level error that wraps all crate-specific errors.
///
/// Through the `eventide` meta-crate you handle this one type instead of
/// importing each sub-crate's error. `?` converts automatically.
#[derive(Debug, thiserror::Error)]
pub enum EventideError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session store, login flow, or access failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Called the backend directly and it said no.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Publishing, booking, or validation failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error() {
        let err: EventideError = StorageError::InvalidKey("../etc".into()).into();
        assert!(matches!(err, EventideError::Storage(_)));
        assert!(err.to_string().contains("../etc"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: EventideError = ProtocolError::InvalidRecord("empty id".into()).into();
        assert!(matches!(err, EventideError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: EventideError = SessionError::AlreadyMounted.into();
        assert!(matches!(err, EventideError::Session(_)));
    }

    #[test]
    fn test_from_auth_error() {
        let err: EventideError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, EventideError::Auth(_)));
    }

    #[test]
    fn test_from_catalog_error() {
        let err: EventideError = CatalogError::Forbidden.into();
        assert_eq!(err.to_string(), "admin session required");
    }
}
