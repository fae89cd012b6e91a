//! Pantry domain module.
//!
//! This crate contains the business rules for pantry items: the per-item
//! purchase/usage lifecycle, expiration countdown and restock suggestions,
//! implemented purely as deterministic domain logic (no IO, no storage, no
//! notification delivery).

pub mod error;
pub mod event;
pub mod item;
pub mod suggestion;

pub use error::PantryError;
pub use event::{
    ErrorRaised, ItemAdded, ItemUpdated, ItemsDeleted, NotificationScheduled, PantryEvent,
    SuggestionsUpdated,
};
pub use item::{EXPIRATION_LEAD_DAYS, Item, ItemRecord, NewItem};
pub use suggestion::{
    MIN_DAYS_SINCE_PURCHASE, MIN_PURCHASES, SuggestionEngine, SuggestionEntry,
};
