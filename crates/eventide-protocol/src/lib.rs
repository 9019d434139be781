//! Shared data model for Eventide.
//!
//! This crate defines the values that every other layer passes around:
//!
//! - **Types** ([`Identity`], [`Session`], [`SourceKind`], [`OverrideRecord`],
//!   etc.): who is using the app and where that answer came from.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how records are turned
//!   into bytes before they reach persistent storage.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between storage (raw bytes under a key) and the
//! session store (the reconciled, observable session). It doesn't know
//! about listeners or backends.
//!
//! ```text
//! Storage (bytes) → Protocol (OverrideRecord) → Session store (Session)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AuthUser, Claims, Identity, OverrideRecord, Session, SessionSnapshot,
    SourceKind, UserId,
};
