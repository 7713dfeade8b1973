//! Entity stores for the bookstore service.
//!
//! A [`Repository`] is a keyed collection of one [`Record`] type with
//! store-assigned ids, CRUD, and predicate search. [`MemoryStore`] keeps the
//! collection in process; [`JsonFileStore`] adds a JSON artifact that is loaded
//! on open and fully replaced on every flush.

pub mod json_file;
pub mod matching;
pub mod memory;

use bookstore_kernel::{Context, Result, SearchParams};
use serde::{de::DeserializeOwned, Serialize};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A type that can live in an entity store.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Singular name used in error messages, e.g. `"book"`.
    const ENTITY: &'static str;
    /// Collection name used for the persisted document, e.g. `"books"`.
    const COLLECTION: &'static str;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Whether this record satisfies a single search parameter.
    ///
    /// Unknown keys must return `true` so they are ignored by the search.
    fn matches(&self, key: &str, value: &str) -> bool;

    /// Whether this record satisfies every parameter.
    fn matches_all(&self, params: &SearchParams) -> bool {
        params
            .iter()
            .all(|(key, value)| self.matches(key, value))
    }
}

/// CRUD and search contract shared by every storage backend.
pub trait Repository<T: Record>: Send + Sync {
    /// Store `record` under the next free id, ignoring any id it carries.
    fn create(&self, ctx: &Context, record: T) -> Result<T>;

    fn get(&self, ctx: &Context, id: u64) -> Result<T>;

    /// Replace the record stored under `id`; the stored id is kept.
    fn update(&self, ctx: &Context, id: u64, record: T) -> Result<T>;

    fn delete(&self, ctx: &Context, id: u64) -> Result<()>;

    /// Records matching every parameter, in insertion order.
    ///
    /// `None` and an empty map both return the full collection.
    fn search(&self, ctx: &Context, params: Option<&SearchParams>) -> Result<Vec<T>>;

    /// Write the full collection to durable storage, if the backend has any.
    fn flush(&self) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
