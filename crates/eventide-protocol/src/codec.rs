//! Codec trait and implementations for turning records into bytes.
//!
//! Storage only deals in bytes under a key. The session store and the
//! bookings list don't care HOW their records become bytes: they just need
//! something that implements [`Codec`]. Swapping the format later means
//! writing one more impl, not touching the stores.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs live inside stores that are
/// shared with backend listener callbacks, which may run on any Tokio
/// worker thread.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON matches what the browser build keeps in local storage, so records
/// stay readable in DevTools and interchangeable between builds.
///
/// ## Example
///
/// ```rust
/// use eventide_protocol::{Codec, Identity, JsonCodec, OverrideRecord};
///
/// let codec = JsonCodec;
/// let record = OverrideRecord::new(Identity::new("u1", "a@b.com"), true);
///
/// let bytes = codec.encode(&record).unwrap();
/// let decoded: OverrideRecord = codec.decode(&bytes).unwrap();
/// assert_eq!(record, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Identity, OverrideRecord};

    #[test]
    fn test_decode_truncated_record_returns_decode_error() {
        let codec = JsonCodec;
        let result: Result<OverrideRecord, _> =
            codec.decode(br#"{"identity":{"id":"u1""#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_decode_error() {
        // Valid JSON, but an array where a record is expected.
        let codec = JsonCodec;
        let result: Result<OverrideRecord, _> = codec.decode(b"[1,2,3]");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_writes_plain_json() {
        let codec = JsonCodec;
        let record = OverrideRecord::new(Identity::new("u1", "a@b.com"), false);
        let bytes = codec.encode(&record).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""email":"a@b.com""#));
        assert!(text.contains(r#""isAdmin":false"#));
    }
}
