//! Bookings persistence settings.

/// Where the bookings list lives in key-value storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingsConfig {
    /// Storage key. Default: `"eventide-bookings-storage"`, the key the
    /// browser build uses.
    pub key: String,
}

impl Default for BookingsConfig {
    fn default() -> Self {
        Self {
            key: "eventide-bookings-storage".to_string(),
        }
    }
}
