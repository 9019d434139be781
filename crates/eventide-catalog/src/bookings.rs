//! Booked events, persisted in key-value storage.
//!
//! The record layout is the browser build's:
//!
//! ```json
//! {"state":{"bookedEvents":[...]},"version":0}
//! ```
//!
//! Every change is written through immediately. If the write fails the
//! in-memory list keeps the change and the error is returned, so the caller
//! can tell the user it won't survive a restart.

use eventide_protocol::{Codec, JsonCodec};
use eventide_storage::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::{BookingsConfig, CatalogError, Event, EventId, Watchlist};

const RECORD_VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct BookingsRecord {
    state: BookingsState,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingsState {
    #[serde(default)]
    booked_events: Vec<Event>,
}

/// The user's booked events.
pub struct Bookings<S: KeyValueStore, C: Codec = JsonCodec> {
    storage: S,
    codec: C,
    config: BookingsConfig,
    list: Watchlist,
}

impl<S: KeyValueStore> Bookings<S> {
    /// Loads the bookings saved under `config.key`.
    ///
    /// A missing, unreadable, or corrupt record yields an empty list; the
    /// last two are logged.
    pub fn load(storage: S, config: BookingsConfig) -> Self {
        Self::load_with_codec(storage, JsonCodec, config)
    }
}

impl<S: KeyValueStore, C: Codec> Bookings<S, C> {
    pub fn load_with_codec(storage: S, codec: C, config: BookingsConfig) -> Self {
        let items = match read_record(&storage, &codec, &config.key) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = %config.key, error = &e as &dyn std::error::Error, "bookings record unusable, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(key = %config.key, count = items.len(), "bookings loaded");
        Self {
            storage,
            codec,
            config,
            list: Watchlist::from_items(items),
        }
    }

    /// Books `event` unless it's already booked.
    ///
    /// Returns `Ok(true)` if the list changed.
    ///
    /// # Errors
    /// The list could not be persisted. The booking is still held in memory.
    pub fn add(&mut self, event: Event) -> Result<bool, CatalogError> {
        let event_id = event.id.clone();
        if !self.list.add(event) {
            return Ok(false);
        }
        tracing::info!(%event_id, "event booked");
        self.persist()?;
        Ok(true)
    }

    /// Cancels the booking for `id`.
    ///
    /// # Errors
    /// Same as [`add`](Self::add).
    pub fn remove(&mut self, id: &EventId) -> Result<bool, CatalogError> {
        if !self.list.remove(id) {
            return Ok(false);
        }
        tracing::info!(event_id = %id, "booking cancelled");
        self.persist()?;
        Ok(true)
    }

    pub fn is_booked(&self, id: &EventId) -> bool {
        self.list.is_watched(id)
    }

    pub fn items(&self) -> &[Event] {
        self.list.items()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    fn persist(&self) -> Result<(), CatalogError> {
        let record = BookingsRecord {
            state: BookingsState {
                booked_events: self.list.items().to_vec(),
            },
            version: RECORD_VERSION,
        };
        let result = self
            .codec
            .encode(&record)
            .map_err(CatalogError::from)
            .and_then(|bytes| Ok(self.storage.set(&self.config.key, &bytes)?));
        if let Err(e) = &result {
            tracing::warn!(key = %self.config.key, error = e as &dyn std::error::Error, "failed to persist bookings");
        }
        result
    }
}

fn read_record<S: KeyValueStore, C: Codec>(
    storage: &S,
    codec: &C,
    key: &str,
) -> Result<Vec<Event>, CatalogError> {
    let Some(bytes) = storage.get(key)? else {
        return Ok(Vec::new());
    };
    let record: BookingsRecord = codec.decode(&bytes)?;
    Ok(record.state.booked_events)
}
