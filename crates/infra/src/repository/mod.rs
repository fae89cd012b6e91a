//! Item repository boundary.
//!
//! Defines the storage-facing abstraction the pantry service writes through,
//! without making any assumptions about the persistence engine.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryItemRepository;
pub use r#trait::{ItemRepository, RepositoryError};
