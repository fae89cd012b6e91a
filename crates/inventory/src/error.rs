//! Caller-facing error surface of the pantry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pantry_core::DomainError;

/// Failure of a pantry operation.
///
/// Always returned as a value; every repository and dispatcher fault is mapped
/// into one of these kinds before it reaches a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PantryError {
    /// An item with exactly this name already exists.
    #[error("an item named \"{0}\" already exists")]
    DuplicateItem(String),

    /// Malformed candidate, unknown item, or a repository fault.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// The item was saved but its expiration warning could not be scheduled.
    #[error("could not schedule expiration notification: {0}")]
    NotificationFailure(String),
}

impl PantryError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateItem(name.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidItem(msg.into())
    }

    pub fn notification(cause: impl Into<String>) -> Self {
        Self::NotificationFailure(cause.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PantryError::DuplicateItem(_) => "duplicate_item",
            PantryError::InvalidItem(_) => "invalid_item",
            PantryError::NotificationFailure(_) => "notification_failure",
        }
    }
}

impl From<DomainError> for PantryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => PantryError::InvalidItem(msg),
            DomainError::InvariantViolation(msg) => PantryError::InvalidItem(msg),
            DomainError::InvalidId(msg) => PantryError::InvalidItem(msg),
        }
    }
}
