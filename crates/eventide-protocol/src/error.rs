//! Error types for the protocol layer.
//!
//! Each crate in Eventide defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning a record into bytes or back,
//! not in the storage medium or the session logic.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: a record written by an older build, a truncated
    /// file, or somebody editing local storage by hand.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The bytes decoded fine but describe something that can't exist,
    /// e.g. an override record whose identity has an empty id.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
