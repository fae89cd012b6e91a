use std::sync::Arc;

use thiserror::Error;

use pantry_core::ItemId;
use pantry_inventory::Item;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Create was called with an id that is already stored.
    #[error("item already stored: {0}")]
    AlreadyExists(ItemId),

    /// Update/delete targeted an id that is not stored.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// Backend failure (lock poisoning, IO, connection loss, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable collection of pantry items.
///
/// Implementations serialize access themselves; callers may share one instance
/// between the service and background readers. Uniqueness of names is *not*
/// assumed here: the service enforces it.
pub trait ItemRepository: Send + Sync {
    fn create(&self, item: Item) -> Result<(), RepositoryError>;

    fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Replace a stored item with the same id.
    fn update(&self, item: Item) -> Result<(), RepositoryError>;

    /// Exact (case-sensitive) name match, ordered by name.
    fn find_by_name(&self, name: &str) -> Result<Vec<Item>, RepositoryError>;

    /// Consistent snapshot of every item, ordered by name.
    fn list(&self) -> Result<Vec<Item>, RepositoryError>;

    fn delete(&self, id: ItemId) -> Result<(), RepositoryError>;
}

impl<R> ItemRepository for Arc<R>
where
    R: ItemRepository + ?Sized,
{
    fn create(&self, item: Item) -> Result<(), RepositoryError> {
        (**self).create(item)
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        (**self).get(id)
    }

    fn update(&self, item: Item) -> Result<(), RepositoryError> {
        (**self).update(item)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Item>, RepositoryError> {
        (**self).find_by_name(name)
    }

    fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        (**self).list()
    }

    fn delete(&self, id: ItemId) -> Result<(), RepositoryError> {
        (**self).delete(id)
    }
}
