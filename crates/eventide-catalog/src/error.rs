//! Error types for the catalog layer.

use std::fmt;

use eventide_protocol::ProtocolError;
use eventide_storage::StorageError;

use crate::EventId;

/// One field of an [`EventDraft`](crate::EventDraft) that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as the form knows it (`"title"`, `"imageUrl"`, ...).
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur during catalog, watchlist, or bookings operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The draft has one or more invalid fields; all of them are listed.
    #[error("event draft has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The caller isn't a signed-in admin.
    #[error("admin session required")]
    Forbidden,

    #[error("event {0} not found")]
    NotFound(EventId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
