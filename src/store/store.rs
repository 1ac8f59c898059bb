//! # Record Store
//!
//! A generic, file-backed record collection: an ordered in-memory `Vec`
//! mirrored by a JSON document on disk.
//!
//! ## Invariants
//! - Ids are never duplicated, and never reused within a process lifetime
//! - Every mutation rewrites the whole durable snapshot before it becomes
//!   visible in memory; a failed write leaves both untouched
//! - Reads observe insertion order
//!
//! The store assumes a single writing process. Within the process, writers
//! are serialized by the collection lock.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info, warn};

use super::errors::{StoreError, StoreResult};
use super::record::{next_id, Record, RecordId};
use super::seed::{normalize_entries, read_json_array, read_seed, Normalize};

struct StoreState<R> {
    records: Vec<R>,
    /// High-water mark; never lowered except by `clear`
    next_id: RecordId,
}

/// Durable store for one record kind
pub struct RecordStore<R: Record> {
    data_path: PathBuf,
    state: RwLock<StoreState<R>>,
}

impl<R: Normalize> RecordStore<R> {
    /// Open the store at `data_path`, seeding it from `seed_path` if needed.
    ///
    /// A durable file holding a JSON array is authoritative: its entries are
    /// read leniently through [`Normalize`], keeping their ids, and the file
    /// itself is left as it is. An absent, blank, unreadable, non-JSON or
    /// non-array durable file falls through to the seed document, whose
    /// normalized contents are persisted before the store is returned.
    pub fn load_or_initialize(
        data_path: impl AsRef<Path>,
        seed_path: impl AsRef<Path>,
    ) -> StoreResult<Self> {
        let data_path = data_path.as_ref().to_path_buf();
        let seed_path = seed_path.as_ref();

        let records = match load_durable::<R>(&data_path) {
            Some(entries) => {
                let records = normalize_entries::<R>(entries)?;
                info!(kind = R::KIND, records = records.len(), path = %data_path.display(), "store loaded");
                records
            }
            None => {
                let records = normalize_entries::<R>(read_seed(seed_path))?;
                write_snapshot(&data_path, &records)?;
                info!(
                    kind = R::KIND,
                    records = records.len(),
                    seed = %seed_path.display(),
                    path = %data_path.display(),
                    "store seeded"
                );
                records
            }
        };

        Ok(Self {
            state: RwLock::new(StoreState {
                next_id: next_id::<R>(max_id(&records))?,
                records,
            }),
            data_path,
        })
    }
}

impl<R: Record> RecordStore<R> {
    /// Path of the durable snapshot
    pub fn path(&self) -> &Path {
        &self.data_path
    }

    /// All records, in insertion order
    pub fn list(&self) -> StoreResult<Vec<R>> {
        Ok(self.read()?.records.clone())
    }

    /// Number of records
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Look a record up by id
    pub fn get(&self, id: RecordId) -> StoreResult<Option<R>> {
        self.find_first(|r| r.id() == id)
    }

    /// First record matching `predicate`, scanning in insertion order
    pub fn find_first<P>(&self, predicate: P) -> StoreResult<Option<R>>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self.read()?.records.iter().find(|r| predicate(r)).cloned())
    }

    /// Create a record from `draft` under the next id and persist it
    pub fn create(&self, draft: R::Draft) -> StoreResult<R> {
        let mut state = self.write()?;

        let id = state.next_id.max(next_id::<R>(max_id(&state.records))?);
        let following = next_id::<R>(id)?;
        let record = R::from_draft(id, draft);

        let mut records = state.records.clone();
        records.push(record.clone());
        self.persist(&records)?;

        state.records = records;
        state.next_id = following;
        Ok(record)
    }

    /// Merge `patch` over the record with `id` and persist.
    ///
    /// Returns `Ok(None)` without writing when no such record exists.
    pub fn update(&self, id: RecordId, patch: R::Patch) -> StoreResult<Option<R>> {
        let mut state = self.write()?;

        let Some(index) = state.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut records = state.records.clone();
        records[index].apply(patch);
        let updated = records[index].clone();
        self.persist(&records)?;

        state.records = records;
        Ok(Some(updated))
    }

    /// Remove the record with `id` and persist.
    ///
    /// Returns `Ok(false)` without writing when no such record exists.
    pub fn remove(&self, id: RecordId) -> StoreResult<bool> {
        let mut state = self.write()?;

        let Some(index) = state.records.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };

        let mut records = state.records.clone();
        records.remove(index);
        self.persist(&records)?;

        state.records = records;
        Ok(true)
    }

    /// Empty the store and persist. Resets id allocation to 1.
    pub fn clear(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        self.persist(&[])?;
        state.records.clear();
        state.next_id = 1;
        Ok(())
    }

    fn persist(&self, records: &[R]) -> StoreResult<()> {
        write_snapshot(&self.data_path, records).inspect_err(|e| {
            error!(kind = R::KIND, path = %self.data_path.display(), error = %e, "durable write failed");
        })
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState<R>>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState<R>>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

fn max_id<R: Record>(records: &[R]) -> RecordId {
    records.iter().map(|r| r.id()).max().unwrap_or(0)
}

/// Raw entries of the durable file, or `None` if it should be (re)seeded
fn load_durable<R: Record>(path: &Path) -> Option<Vec<serde_json::Value>> {
    match read_json_array(path) {
        Ok(entries) => entries,
        Err(reason) => {
            warn!(kind = R::KIND, path = %path.display(), %reason, "durable file unusable, falling back to seed");
            None
        }
    }
}

/// Atomically replace the durable file with `records`.
///
/// Writes a sibling temp file, fsyncs it, then renames it over the target.
fn write_snapshot<R: Record>(path: &Path, records: &[R]) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::persistence(parent, e))?;
    }

    let temp_path = temp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| StoreError::persistence(&temp_path, e))?;

    file.write_all(content.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| StoreError::persistence(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::persistence(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Map, Value};
    use tempfile::TempDir;

    use crate::store::seed::string_field;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: RecordId,
        title: String,
        body: String,
    }

    struct NoteDraft {
        title: String,
        body: String,
    }

    #[derive(Default)]
    struct NotePatch {
        title: Option<String>,
        body: Option<String>,
    }

    impl Record for Note {
        type Draft = NoteDraft;
        type Patch = NotePatch;
        const KIND: &'static str = "notes";

        fn id(&self) -> RecordId {
            self.id
        }

        fn from_draft(id: RecordId, draft: NoteDraft) -> Self {
            Self {
                id,
                title: draft.title,
                body: draft.body,
            }
        }

        fn apply(&mut self, patch: NotePatch) {
            if let Some(title) = patch.title {
                self.title = title;
            }
            if let Some(body) = patch.body {
                self.body = body;
            }
        }
    }

    impl Normalize for Note {
        fn normalize(id: RecordId, entry: &Map<String, Value>) -> StoreResult<Option<Self>> {
            Ok(Some(Note {
                id,
                title: string_field(entry, "title").unwrap_or_default(),
                body: string_field(entry, "body").unwrap_or_default(),
            }))
        }
    }

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            body: String::new(),
        }
    }

    fn open(dir: &TempDir) -> RecordStore<Note> {
        RecordStore::load_or_initialize(dir.path().join("notes.json"), dir.path().join("notes.seed.json"))
            .unwrap()
    }

    #[test]
    fn test_create_allocates_increasing_ids_from_one() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);

        let ids: Vec<_> = (0..5).map(|i| store.create(draft(&i.to_string())).unwrap().id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_deleted_ids_not_recycled() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);

        store.create(draft("a")).unwrap();
        let b = store.create(draft("b")).unwrap();
        assert!(store.remove(b.id).unwrap());

        let c = store.create(draft("c")).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_update_merges_and_keeps_id() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);

        let note = store
            .create(NoteDraft {
                title: "A".into(),
                body: "X".into(),
            })
            .unwrap();

        let updated = store
            .update(
                note.id,
                NotePatch {
                    title: Some("B".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(
            updated,
            Note {
                id: 1,
                title: "B".into(),
                body: "X".into()
            }
        );
        assert_eq!(store.get(1).unwrap(), Some(updated));
    }

    #[test]
    fn test_update_missing_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store.update(42, NotePatch::default()).unwrap().is_none());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        let note = store.create(draft("a")).unwrap();

        assert!(!store.remove(99).unwrap());
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.remove(note.id).unwrap());
        assert!(store.get(note.id).unwrap().is_none());
    }

    #[test]
    fn test_reload_round_trip_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        for title in ["c", "a", "b"] {
            store.create(draft(title)).unwrap();
        }
        store.remove(2).unwrap();
        let expected = store.list().unwrap();
        drop(store);

        let reopened = open(&tmp);
        assert_eq!(reopened.list().unwrap(), expected);
        assert_eq!(reopened.create(draft("d")).unwrap().id, 4);
    }

    #[test]
    fn test_seeded_when_durable_file_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("notes.seed.json"),
            json!([{"title": "first"}, {"id": 10, "title": "second"}]).to_string(),
        )
        .unwrap();

        let store = open(&tmp);
        let titles: Vec<_> = store.list().unwrap().into_iter().map(|n| (n.id, n.title)).collect();
        assert_eq!(titles, vec![(1, "first".to_string()), (10, "second".to_string())]);
        assert!(tmp.path().join("notes.json").exists());
        assert_eq!(store.create(draft("third")).unwrap().id, 11);
    }

    #[test]
    fn test_malformed_durable_file_falls_back_to_seed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.json"), "{ not json").unwrap();
        fs::write(tmp.path().join("notes.seed.json"), r#"[{"title": "seeded"}]"#).unwrap();

        let store = open(&tmp);
        assert_eq!(store.list().unwrap()[0].title, "seeded");

        let on_disk: Vec<Note> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, store.list().unwrap());
    }

    #[test]
    fn test_existing_durable_file_not_reseeded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.json"), r#"[{"id": 3, "title": "kept", "body": ""}]"#).unwrap();
        fs::write(tmp.path().join("notes.seed.json"), r#"[{"title": "ignored"}]"#).unwrap();

        let store = open(&tmp);
        let notes = store.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "kept");
    }

    #[test]
    fn test_drifted_durable_file_read_leniently() {
        let tmp = TempDir::new().unwrap();
        let durable = r#"[{"id": 4, "title": "old shape"}, {"title": "no id", "body": 7}]"#;
        fs::write(tmp.path().join("notes.json"), durable).unwrap();
        fs::write(tmp.path().join("notes.seed.json"), r#"[{"title": "ignored"}]"#).unwrap();

        let store = open(&tmp);
        let notes: Vec<_> = store.list().unwrap().into_iter().map(|n| (n.id, n.title)).collect();
        assert_eq!(notes, vec![(4, "old shape".to_string()), (5, "no id".to_string())]);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), durable);
    }

    #[test]
    fn test_non_array_durable_file_is_reseeded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.json"), r#"{"id": 1}"#).unwrap();
        fs::write(tmp.path().join("notes.seed.json"), r#"[{"title": "seeded"}]"#).unwrap();

        assert_eq!(open(&tmp).list().unwrap()[0].title, "seeded");
    }

    #[test]
    fn test_top_of_range_id_reallocated_on_load() {
        let tmp = TempDir::new().unwrap();
        let durable = json!([{"id": 2, "title": "a"}, {"id": RecordId::MAX, "title": "b"}]);
        fs::write(tmp.path().join("notes.json"), durable.to_string()).unwrap();

        let store = open(&tmp);
        let ids: Vec<_> = store.list().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.create(draft("c")).unwrap().id, 4);
    }

    #[test]
    fn test_create_fails_when_ids_exhausted() {
        let tmp = TempDir::new().unwrap();
        let durable = json!([{"id": RecordId::MAX - 1, "title": "last"}]);
        fs::write(tmp.path().join("notes.json"), durable.to_string()).unwrap();

        let store = open(&tmp);
        let result = store.create(draft("overflow"));
        assert!(matches!(result, Err(StoreError::IdExhausted { kind: "notes" })));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_blank_durable_file_is_reseeded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.json"), "  \n").unwrap();

        let store = open(&tmp);
        assert!(store.is_empty().unwrap());
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "[]");
    }

    #[test]
    fn test_clear_resets_and_persists() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        store.create(draft("a")).unwrap();
        store.create(draft("b")).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.create(draft("c")).unwrap().id, 1);

        drop(store);
        assert_eq!(open(&tmp).len().unwrap(), 1);
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp);
        store.create(draft("a")).unwrap();

        // A directory squatting on the temp path makes the snapshot write fail
        fs::create_dir(temp_path(store.path())).unwrap();

        let result = store.create(draft("b"));
        assert!(matches!(result, Err(StoreError::Persistence { .. })));
        assert_eq!(store.len().unwrap(), 1);
    }
}
