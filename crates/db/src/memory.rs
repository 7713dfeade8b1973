use bookstore_kernel::{Context, Error, Result, SearchParams};
use parking_lot::RwLock;

use crate::{Record, Repository};

/// In-process entity store.
///
/// One lock guards both the records and the id counter, so id allocation and
/// insertion happen as a single step and no reader sees a half-applied write.
pub struct MemoryStore<T> {
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    last_id: u64,
    records: Vec<T>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed the store with existing records; the id counter continues from
    /// the highest id present.
    pub fn with_records(records: Vec<T>) -> Self {
        let last_id = records.iter().map(Record::id).max().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner { last_id, records }),
        }
    }

    /// The most recently allocated id.
    pub fn last_id(&self) -> u64 {
        self.inner.read().last_id
    }

    /// Clone of the full collection in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.read().records.clone()
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryStore<T> {
    fn create(&self, ctx: &Context, mut record: T) -> Result<T> {
        ctx.check()?;
        let mut inner = self.inner.write();

        inner.last_id += 1;
        record.set_id(inner.last_id);
        inner.records.push(record.clone());

        Ok(record)
    }

    fn get(&self, ctx: &Context, id: u64) -> Result<T> {
        ctx.check()?;
        let inner = self.inner.read();

        inner
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| Error::not_found(T::ENTITY, id))
    }

    fn update(&self, ctx: &Context, id: u64, mut record: T) -> Result<T> {
        ctx.check()?;
        let mut inner = self.inner.write();

        let slot = inner
            .records
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or_else(|| Error::not_found(T::ENTITY, id))?;
        record.set_id(id);
        *slot = record.clone();

        Ok(record)
    }

    fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        ctx.check()?;
        let mut inner = self.inner.write();

        let position = inner
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::ENTITY, id))?;
        inner.records.remove(position);

        Ok(())
    }

    fn search(&self, ctx: &Context, params: Option<&SearchParams>) -> Result<Vec<T>> {
        ctx.check()?;
        let inner = self.inner.read();

        let records = match params {
            Some(params) if !params.is_empty() => inner
                .records
                .iter()
                .filter(|record| record.matches_all(params))
                .cloned()
                .collect(),
            _ => inner.records.clone(),
        };

        Ok(records)
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().records.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::matching;
    use bookstore_kernel::query::search_params;
    use serde::{Deserialize, Serialize};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Note {
        pub id: u64,
        pub title: String,
        pub tags: Vec<String>,
    }

    impl Note {
        pub(crate) fn new(title: &str, tags: &[&str]) -> Self {
            Self {
                id: 0,
                title: title.to_string(),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
            }
        }
    }

    impl Record for Note {
        const ENTITY: &'static str = "note";
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> u64 {
            self.id
        }

        fn set_id(&mut self, id: u64) {
            self.id = id;
        }

        fn matches(&self, key: &str, value: &str) -> bool {
            match key {
                "title" => matching::eq_ignore_case(&self.title, value),
                "tag" => matching::any_eq_ignore_case(&self.tags, value),
                _ => true,
            }
        }
    }

    fn ctx() -> Context {
        Context::background()
    }

    #[test]
    fn create_assigns_sequential_ids_ignoring_input_id() {
        let store = MemoryStore::new();
        let mut note = Note::new("first", &[]);
        note.id = 42;

        let first = store.create(&ctx(), note).unwrap();
        let second = store.create(&ctx(), Note::new("second", &[])).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn counter_is_seeded_from_max_id() {
        let mut seeded = Note::new("old", &[]);
        seeded.id = 7;
        let mut other = Note::new("older", &[]);
        other.id = 3;
        let store = MemoryStore::with_records(vec![seeded, other]);

        let created = store.create(&ctx(), Note::new("new", &[])).unwrap();
        assert_eq!(created.id, 8);
    }

    #[test]
    fn concurrent_creates_get_distinct_gap_free_ids() {
        let mut seeded = Note::new("seed", &[]);
        seeded.id = 10;
        let store = Arc::new(MemoryStore::with_records(vec![seeded]));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|n| {
                            store
                                .create(&Context::background(), Note::new(&format!("{worker}-{n}"), &[]))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        let unique: HashSet<u64> = ids.iter().copied().collect();

        assert_eq!(unique.len(), 400);
        assert_eq!(unique, (11..=410).collect::<HashSet<u64>>());
        assert_eq!(store.len(), 401);
    }

    #[test]
    fn get_after_delete_is_not_found() {
        let store = MemoryStore::new();
        let note = store.create(&ctx(), Note::new("gone", &[])).unwrap();

        store.delete(&ctx(), note.id).unwrap();

        assert!(store.get(&ctx(), note.id).unwrap_err().is_not_found());
        assert!(store.delete(&ctx(), note.id).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_removes_by_id_and_keeps_order() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c"] {
            store.create(&ctx(), Note::new(title, &[])).unwrap();
        }

        store.delete(&ctx(), 2).unwrap();

        let titles: Vec<_> = store
            .search(&ctx(), None)
            .unwrap()
            .into_iter()
            .map(|note| note.title)
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn concurrent_deletes_of_same_id_succeed_once() {
        let store = Arc::new(MemoryStore::new());
        for title in ["a", "b", "c"] {
            store.create(&ctx(), Note::new(title, &[])).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.delete(&Context::background(), 2).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        let ids: Vec<_> = store.snapshot().iter().map(|note| note.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn update_preserves_id() {
        let store = MemoryStore::new();
        let created = store.create(&ctx(), Note::new("draft", &[])).unwrap();

        let mut replacement = Note::new("final", &["done"]);
        replacement.id = 99;
        let updated = store.update(&ctx(), created.id, replacement).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(store.get(&ctx(), created.id).unwrap(), updated);
        assert!(store
            .update(&ctx(), 99, Note::new("x", &[]))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn empty_and_missing_params_return_everything_in_order() {
        let store = MemoryStore::new();
        for title in ["c", "a", "b"] {
            store.create(&ctx(), Note::new(title, &[])).unwrap();
        }

        let all = store.search(&ctx(), None).unwrap();
        let empty = store.search(&ctx(), Some(&SearchParams::new())).unwrap();

        assert_eq!(all, empty);
        let titles: Vec<_> = all.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn search_ands_params_and_ignores_unknown_keys() {
        let store = MemoryStore::new();
        store.create(&ctx(), Note::new("Rust", &["lang"])).unwrap();
        store.create(&ctx(), Note::new("Rust", &["game"])).unwrap();
        store.create(&ctx(), Note::new("Go", &["Lang"])).unwrap();

        let params = search_params([("title", "rust"), ("tag", "LANG"), ("colour", "red")]);
        let found = store.search(&ctx(), Some(&params)).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn cancelled_context_blocks_every_operation() {
        let store = MemoryStore::new();
        store.create(&ctx(), Note::new("keep", &[])).unwrap();
        let cancelled = Context::background();
        cancelled.cancel();

        assert!(matches!(
            store.create(&cancelled, Note::new("late", &[])),
            Err(Error::Cancelled)
        ));
        assert!(matches!(store.delete(&cancelled, 1), Err(Error::Cancelled)));
        assert!(matches!(store.search(&cancelled, None), Err(Error::Cancelled)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.last_id(), 1);
    }
}
