use std::fs;
use std::path::{Path, PathBuf};

use bookstore_kernel::{Context, Error, Result, SearchParams};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::{MemoryStore, Record, Repository};

/// Entity store backed by a JSON document of the form `{"<collection>": [...]}`.
///
/// The document is read once on [`open`](Self::open) and rewritten in full by
/// [`flush`](Repository::flush); it is never appended to.
pub struct JsonFileStore<T> {
    path: PathBuf,
    records: MemoryStore<T>,
    flush_lock: Mutex<()>,
}

impl<T: Record> JsonFileStore<T> {
    /// Open `<dir>/<collection>.json`, creating the directory and an empty
    /// document when they do not exist yet.
    pub fn open_in(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(dir.as_ref().join(format!("{}.json", T::COLLECTION)))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }

        if !path.exists() {
            write_document::<T>(&path, &[])?;
            tracing::info!(path = %path.display(), collection = T::COLLECTION, "initialized empty store file");
        }

        let bytes = fs::read(&path).map_err(|err| Error::io(&path, err))?;
        let records = decode::<T>(&bytes).map_err(|err| Error::decode(&path, err))?;
        tracing::info!(
            path = %path.display(),
            collection = T::COLLECTION,
            count = records.len(),
            "loaded store file"
        );

        Ok(Self {
            path,
            records: MemoryStore::with_records(records),
            flush_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_id(&self) -> u64 {
        self.records.last_id()
    }
}

impl<T: Record> Repository<T> for JsonFileStore<T> {
    fn create(&self, ctx: &Context, record: T) -> Result<T> {
        self.records.create(ctx, record)
    }

    fn get(&self, ctx: &Context, id: u64) -> Result<T> {
        self.records.get(ctx, id)
    }

    fn update(&self, ctx: &Context, id: u64, record: T) -> Result<T> {
        self.records.update(ctx, id, record)
    }

    fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        self.records.delete(ctx, id)
    }

    fn search(&self, ctx: &Context, params: Option<&SearchParams>) -> Result<Vec<T>> {
        self.records.search(ctx, params)
    }

    fn flush(&self) -> Result<()> {
        // Serialized so an older snapshot can never land after a newer one.
        let _guard = self.flush_lock.lock();
        let snapshot = self.records.snapshot();
        write_document::<T>(&self.path, &snapshot)?;

        tracing::debug!(
            path = %self.path.display(),
            collection = T::COLLECTION,
            count = snapshot.len(),
            "flushed store file"
        );
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

fn encode<T: Record>(records: &[T]) -> serde_json::Result<Vec<u8>> {
    let mut document = Map::new();
    document.insert(T::COLLECTION.to_string(), serde_json::to_value(records)?);
    serde_json::to_vec_pretty(&Value::Object(document))
}

fn decode<T: Record>(bytes: &[u8]) -> serde_json::Result<Vec<T>> {
    let mut document: Map<String, Value> = serde_json::from_slice(bytes)?;
    let records: Vec<T> = match document.remove(T::COLLECTION) {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };

    let mut seen = std::collections::HashSet::with_capacity(records.len());
    if let Some(duplicate) = records.iter().find(|record| !seen.insert(record.id())) {
        return Err(serde::de::Error::custom(format!(
            "duplicate {} id {}",
            T::ENTITY,
            duplicate.id()
        )));
    }

    Ok(records)
}

/// Replace the document at `path` via a temporary sibling and a rename.
fn write_document<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    let bytes = encode(records).map_err(|err| Error::decode(path, err))?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|err| Error::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| Error::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::Note;

    fn ctx() -> Context {
        Context::background()
    }

    #[test]
    fn missing_file_is_initialized_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::open_in(dir.path().join("data")).unwrap();

        assert!(store.is_empty());
        let raw: Value = serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "notes": [] }));
    }

    #[test]
    fn flush_then_reopen_round_trips_and_seeds_counter() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::open_in(dir.path()).unwrap();
        store.create(&ctx(), Note::new("one", &["a"])).unwrap();
        store.create(&ctx(), Note::new("two", &[])).unwrap();
        store.create(&ctx(), Note::new("three", &[])).unwrap();
        store.delete(&ctx(), 3).unwrap();
        store.flush().unwrap();

        let reopened = JsonFileStore::<Note>::open_in(dir.path()).unwrap();
        assert_eq!(reopened.search(&ctx(), None).unwrap(), store.search(&ctx(), None).unwrap());

        // The counter restarts from the max id on disk, not from the
        // in-process counter of the previous store.
        let created = reopened.create(&ctx(), Note::new("four", &[])).unwrap();
        assert_eq!(created.id, 3);
    }

    #[test]
    fn flush_replaces_the_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::open_in(dir.path()).unwrap();
        store.create(&ctx(), Note::new("one", &[])).unwrap();
        store.flush().unwrap();
        store.delete(&ctx(), 1).unwrap();
        store.flush().unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "notes": [] }));
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.json"), b"{ not json").unwrap();

        let err = JsonFileStore::<Note>::open_in(dir.path()).err().unwrap();
        assert!(err.is_persistence());
    }

    #[test]
    fn duplicate_ids_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("notes.json"),
            br#"{"notes": [{"id": 1, "title": "a", "tags": []}, {"id": 1, "title": "b", "tags": []}]}"#,
        )
        .unwrap();

        let err = JsonFileStore::<Note>::open_in(dir.path()).err().unwrap();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
