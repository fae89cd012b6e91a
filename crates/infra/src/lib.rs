//! Infrastructure layer: repository and notification boundaries, the pantry
//! service that orchestrates them, and its background refresher.

pub mod config;
pub mod expiring;
pub mod notification;
pub mod refresher;
pub mod repository;
pub mod service;

pub use config::PantryConfig;
pub use expiring::ExpiringValue;
pub use notification::{
    AuthorizationFlag, DispatchError, NotificationAuthorization, NotificationDispatcher,
    NotificationRequest, RecordingDispatcher,
};
pub use refresher::{RefresherHandle, SuggestionRefresher};
pub use repository::{InMemoryItemRepository, ItemRepository, RepositoryError};
pub use service::{
    AddItemOutcome, NotificationOutcome, PantryService, RefreshSignal, SkipReason,
};
