use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pantry_core::ItemId;
use pantry_events::Event;

use crate::error::PantryError;

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub expiration_date: Option<NaiveDate>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated (purchase or usage recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsDeleted {
    pub item_ids: Vec<ItemId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: NotificationScheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationScheduled {
    pub item_id: ItemId,
    pub identifier: String,
    pub fire_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ErrorRaised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRaised {
    pub error: PantryError,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SuggestionsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsUpdated {
    pub names: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Everything observers of the pantry can be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PantryEvent {
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemsDeleted(ItemsDeleted),
    NotificationScheduled(NotificationScheduled),
    ErrorRaised(ErrorRaised),
    SuggestionsUpdated(SuggestionsUpdated),
}

impl Event for PantryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PantryEvent::ItemAdded(_) => "pantry.item.added",
            PantryEvent::ItemUpdated(_) => "pantry.item.updated",
            PantryEvent::ItemsDeleted(_) => "pantry.items.deleted",
            PantryEvent::NotificationScheduled(_) => "pantry.notification.scheduled",
            PantryEvent::ErrorRaised(_) => "pantry.error.raised",
            PantryEvent::SuggestionsUpdated(_) => "pantry.suggestions.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PantryEvent::ItemAdded(e) => e.occurred_at,
            PantryEvent::ItemUpdated(e) => e.occurred_at,
            PantryEvent::ItemsDeleted(e) => e.occurred_at,
            PantryEvent::NotificationScheduled(e) => e.occurred_at,
            PantryEvent::ErrorRaised(e) => e.occurred_at,
            PantryEvent::SuggestionsUpdated(e) => e.occurred_at,
        }
    }
}
