use std::collections::HashMap;
use std::sync::RwLock;

use pantry_core::ItemId;
use pantry_inventory::Item;

use super::r#trait::{ItemRepository, RepositoryError};

/// In-memory item repository.
///
/// Intended for tests/dev and single-process embedding. A single `RwLock` guards
/// the whole collection, so `list()` never observes a half-applied write.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a repository with existing items (e.g. loaded from an export).
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items.into_iter().map(|i| (i.id_typed(), i)).collect();
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("item store lock poisoned".to_string())
}

fn sorted_by_name(mut items: Vec<Item>) -> Vec<Item> {
    // Deterministic order: name, then id for same-named records.
    items.sort_by(|a, b| {
        a.name()
            .cmp(b.name())
            .then_with(|| a.id_typed().cmp(&b.id_typed()))
    });
    items
}

impl ItemRepository for InMemoryItemRepository {
    fn create(&self, item: Item) -> Result<(), RepositoryError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        let id = item.id_typed();
        if map.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }
        map.insert(id, item);
        Ok(())
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn update(&self, item: Item) -> Result<(), RepositoryError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        match map.get_mut(&item.id_typed()) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(item.id_typed())),
        }
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Item>, RepositoryError> {
        let map = self.items.read().map_err(|_| poisoned())?;
        let hits = map.values().filter(|i| i.name() == name).cloned().collect();
        Ok(sorted_by_name(hits))
    }

    fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(sorted_by_name(map.values().cloned().collect()))
    }

    fn delete(&self, id: ItemId) -> Result<(), RepositoryError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound(id))
    }
}
