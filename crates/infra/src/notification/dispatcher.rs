use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pantry_core::ValueObject;
use pantry_inventory::Item;

/// Prefix of every expiration warning identifier.
pub const EXPIRATION_IDENTIFIER_PREFIX: &str = "expiration-";

/// A request to fire an alert on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Deterministic per item; scheduling the same identifier again replaces the alert.
    pub identifier: String,
    pub fire_date: NaiveDate,
    pub title: String,
    pub body: String,
}

impl ValueObject for NotificationRequest {}

impl NotificationRequest {
    /// Deterministic alert identifier for items named `name`.
    pub fn identifier_for(name: &str) -> String {
        format!("{EXPIRATION_IDENTIFIER_PREFIX}{name}")
    }

    /// Expiration warning for `item`, firing on `fire_date`.
    ///
    /// Returns `None` when the item has no expiration date.
    pub fn expiration_warning(item: &Item, fire_date: NaiveDate) -> Option<Self> {
        let expires = item.expiration_date()?;
        Some(Self {
            identifier: Self::identifier_for(item.name()),
            fire_date,
            title: "Item expiring soon".to_string(),
            body: format!("{} expires on {}", item.name(), expires.format("%Y-%m-%d")),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The platform refused the request (quota, invalid date, ...).
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// The platform could not be reached.
    #[error("notification service unavailable: {0}")]
    Unavailable(String),
}

/// Platform notification scheduler.
pub trait NotificationDispatcher: Send + Sync {
    fn schedule(&self, request: &NotificationRequest) -> Result<(), DispatchError>;

    /// Withdraw a pending alert. Platforms without cancellation keep the default no-op.
    fn cancel(&self, _identifier: &str) -> Result<(), DispatchError> {
        Ok(())
    }
}

impl<D> NotificationDispatcher for Arc<D>
where
    D: NotificationDispatcher + ?Sized,
{
    fn schedule(&self, request: &NotificationRequest) -> Result<(), DispatchError> {
        (**self).schedule(request)
    }

    fn cancel(&self, identifier: &str) -> Result<(), DispatchError> {
        (**self).cancel(identifier)
    }
}

/// Whether notification delivery is currently permitted (user authorization).
pub trait NotificationAuthorization: Send + Sync {
    fn is_permitted(&self) -> bool;
}

impl<A> NotificationAuthorization for Arc<A>
where
    A: NotificationAuthorization + ?Sized,
{
    fn is_permitted(&self) -> bool {
        (**self).is_permitted()
    }
}

/// Authorization state that the platform layer can flip at runtime.
#[derive(Debug)]
pub struct AuthorizationFlag(AtomicBool);

impl AuthorizationFlag {
    pub fn new(permitted: bool) -> Self {
        Self(AtomicBool::new(permitted))
    }

    pub fn granted() -> Self {
        Self::new(true)
    }

    pub fn denied() -> Self {
        Self::new(false)
    }

    pub fn set(&self, permitted: bool) {
        self.0.store(permitted, Ordering::SeqCst);
    }
}

impl Default for AuthorizationFlag {
    fn default() -> Self {
        Self::granted()
    }
}

impl NotificationAuthorization for AuthorizationFlag {
    fn is_permitted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
