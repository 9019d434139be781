//! The event catalog: every published event, managed by admins.

use std::collections::HashMap;

use eventide_protocol::Session;
use eventide_session::require_admin;

use crate::{CatalogError, Event, EventDraft, EventId};

/// Published events, keyed by id.
///
/// Anyone can read; only an admin session can add or remove.
#[derive(Debug, Default)]
pub struct EventCatalog {
    events: HashMap<EventId, Event>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `draft` and publishes it under a fresh id.
    ///
    /// # Errors
    /// - [`CatalogError::Forbidden`]: `session` isn't a signed-in admin
    /// - [`CatalogError::Validation`]: one entry per bad field
    pub fn add_event(&mut self, session: &Session, draft: EventDraft) -> Result<Event, CatalogError> {
        let admin = require_admin(session).map_err(|_| CatalogError::Forbidden)?;
        let event = draft
            .into_event(EventId::new())
            .map_err(CatalogError::Validation)?;

        tracing::info!(event_id = %event.id, admin_id = %admin.id, title = %event.title, "event published");
        self.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    /// Takes an event off the catalog.
    ///
    /// # Errors
    /// - [`CatalogError::Forbidden`]
    /// - [`CatalogError::NotFound`]
    pub fn remove(&mut self, session: &Session, id: &EventId) -> Result<Event, CatalogError> {
        let admin = require_admin(session).map_err(|_| CatalogError::Forbidden)?;
        let event = self
            .events
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        tracing::info!(event_id = %id, admin_id = %admin.id, "event removed");
        Ok(event)
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    /// All events, latest date first. Same-day events are ordered by title.
    pub fn list(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.values().collect();
        events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventide_protocol::Identity;

    fn admin() -> Session {
        Session::live(Identity::new("admin-1", "admin@eventide.com"), true)
    }

    fn draft(title: &str, date: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            date: date.into(),
            time: "10:00 AM".into(),
            location: "Convention Centre".into(),
            description: "A day of talks and workshops.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_event_requires_admin() {
        let mut catalog = EventCatalog::new();
        let visitor = Session::live(Identity::new("u1", "u1@example.com"), false);

        assert!(matches!(
            catalog.add_event(&Session::signed_out(), draft("Expo", "2026-03-01")),
            Err(CatalogError::Forbidden)
        ));
        assert!(matches!(
            catalog.add_event(&visitor, draft("Expo", "2026-03-01")),
            Err(CatalogError::Forbidden)
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_add_event_rejects_invalid_draft() {
        let mut catalog = EventCatalog::new();
        let result = catalog.add_event(&admin(), draft("Ex", "2026-03-01"));

        let Err(CatalogError::Validation(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn test_list_is_sorted_latest_first() {
        let mut catalog = EventCatalog::new();
        catalog.add_event(&admin(), draft("Spring Expo", "2026-03-01")).unwrap();
        catalog.add_event(&admin(), draft("Winter Gala", "2026-12-05")).unwrap();
        catalog.add_event(&admin(), draft("Autumn Fair", "2026-12-05")).unwrap();

        let titles: Vec<&str> = catalog.list().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Autumn Fair", "Winter Gala", "Spring Expo"]);
    }

    #[test]
    fn test_remove_event() {
        let mut catalog = EventCatalog::new();
        let event = catalog.add_event(&admin(), draft("Expo", "2026-03-01")).unwrap();

        assert_eq!(catalog.get(&event.id), Some(&event));
        assert_eq!(catalog.remove(&admin(), &event.id).unwrap(), event);
        assert!(matches!(
            catalog.remove(&admin(), &event.id),
            Err(CatalogError::NotFound(id)) if id == event.id
        ));
    }
}
