//! Events a visitor is watching. Lives for one run only.

use crate::{Event, EventId};

/// An ordered, de-duplicated list of events.
///
/// Also the in-memory half of [`Bookings`](crate::Bookings).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    items: Vec<Event>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(items: Vec<Event>) -> Self {
        let mut list = Self::new();
        for event in items {
            list.add(event);
        }
        list
    }

    /// Appends `event` unless one with the same id is already listed.
    ///
    /// Returns `true` if the list changed.
    pub fn add(&mut self, event: Event) -> bool {
        if self.is_watched(&event.id) {
            return false;
        }
        self.items.push(event);
        true
    }

    /// Removes the event with `id`. Returns `true` if the list changed.
    pub fn remove(&mut self, id: &EventId) -> bool {
        let before = self.items.len();
        self.items.retain(|e| &e.id != id);
        self.items.len() != before
    }

    pub fn is_watched(&self, id: &EventId) -> bool {
        self.items.iter().any(|e| &e.id == id)
    }

    /// Listed events, oldest addition first.
    pub fn items(&self) -> &[Event] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
