//! Events and the lists built from them.
//!
//! - [`EventDraft`] / [`Event`]: what an admin submits and what gets listed
//! - [`EventCatalog`]: the event list, writable by admins only
//! - [`Watchlist`]: events a visitor is keeping an eye on (this run only)
//! - [`Bookings`]: booked events, persisted across restarts

mod bookings;
mod catalog;
mod config;
mod error;
mod event;
mod watchlist;

pub use bookings::Bookings;
pub use catalog::EventCatalog;
pub use config::BookingsConfig;
pub use error::{CatalogError, FieldError};
pub use event::{Event, EventDraft, EventId};
pub use watchlist::Watchlist;
