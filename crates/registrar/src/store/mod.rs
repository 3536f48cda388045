//! Record store for registrar.
//!
//! Each collection lives in one JSON document mapping id → record. Every
//! operation loads the whole collection, and writes replace the document,
//! which suits a single in-process writer over small files.

pub mod backend;
pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

pub use backend::{Backend, DirBackend, MemoryBackend};
pub use schema::Collection;

/// A record that can be kept in the store.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Collection the record type lives in.
    const COLLECTION: Collection;

    /// Unique id within the collection.
    fn id(&self) -> &str;

    /// Check record-level rules before a write.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first broken rule.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Store of every collection.
///
/// Reads take `&self` and writes take `&mut self`, so one store value is the
/// single writer for its data.
#[derive(Debug)]
pub struct RecordStore {
    backend: Box<dyn Backend>,
    pretty: bool,
}

impl RecordStore {
    /// Open or create a store in `dir`.
    ///
    /// Creates the directory and any missing collection files, then brings
    /// the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the store was
    /// written by a newer version.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let store = Self::with_backend(Box::new(DirBackend::open(dir)?))?;
        info!("Record store opened at {}", store.location());
        Ok(store)
    }

    /// Open the store named by the configuration.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::open`].
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let mut store = Self::open(config.data_dir())?;
        store.pretty = config.storage.pretty_json;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if initialisation fails.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    /// Open a store over any backend.
    ///
    /// # Errors
    ///
    /// Returns an error if initialisation fails.
    pub fn with_backend(mut backend: Box<dyn Backend>) -> Result<Self> {
        migrations::initialize(backend.as_mut())?;
        Ok(Self {
            backend,
            pretty: true,
        })
    }

    /// Where the store keeps its data.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Set whether collection documents are indented.
    pub fn set_pretty(&mut self, pretty: bool) {
        self.pretty = pretty;
    }

    fn load<R: Record>(&self) -> Result<BTreeMap<String, R>> {
        self.load_raw(R::COLLECTION)
    }

    fn load_raw<T: DeserializeOwned>(&self, collection: Collection) -> Result<BTreeMap<String, T>> {
        let Some(contents) = self.backend.read(collection.name())? else {
            return Ok(BTreeMap::new());
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let records: BTreeMap<String, T> = serde_json::from_str(&contents)?;
        debug!("Loaded {} {} records", records.len(), collection);
        Ok(records)
    }

    fn save<R: Record>(&mut self, records: &BTreeMap<String, R>) -> Result<()> {
        let contents = if self.pretty {
            serde_json::to_string_pretty(records)?
        } else {
            serde_json::to_string(records)?
        };
        self.backend.write(R::COLLECTION.name(), &contents)?;
        debug!("Saved {} {} records", records.len(), R::COLLECTION);
        Ok(())
    }

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has the id.
    pub fn get<R: Record>(&self, id: &str) -> Result<R> {
        self.find(id)?
            .ok_or_else(|| Error::not_found(R::COLLECTION.name(), id))
    }

    /// Fetch a record by id if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn find<R: Record>(&self, id: &str) -> Result<Option<R>> {
        Ok(self.load::<R>()?.remove(id))
    }

    /// Whether a record with the id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn contains<R: Record>(&self, id: &str) -> Result<bool> {
        Ok(self.load::<R>()?.contains_key(id))
    }

    /// All records matching `predicate`, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn list<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> Result<Vec<R>> {
        Ok(self
            .load::<R>()?
            .into_values()
            .filter(|record| predicate(record))
            .collect())
    }

    /// All records of a collection, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn all<R: Record>(&self) -> Result<Vec<R>> {
        self.list(|_: &R| true)
    }

    /// Number of records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn count<R: Record>(&self) -> Result<usize> {
        Ok(self.load::<R>()?.len())
    }

    /// Insert or replace a record by id.
    ///
    /// Returns `true` if the record was newly created.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty id or a record that fails
    /// [`Record::validate`], or an error if the collection cannot be written.
    pub fn upsert<R: Record>(&mut self, record: R) -> Result<bool> {
        Self::check(&record)?;

        let mut records = self.load::<R>()?;
        let id = record.id().to_string();
        let created = records.insert(id.clone(), record).is_none();
        self.save(&records)?;

        debug!(
            "{} {} record {}",
            if created { "Created" } else { "Updated" },
            R::COLLECTION,
            id
        );
        Ok(created)
    }

    /// Insert a record whose id must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] if the id is taken, plus the errors of
    /// [`RecordStore::upsert`].
    pub fn insert<R: Record>(&mut self, record: R) -> Result<()> {
        Self::check(&record)?;

        let mut records = self.load::<R>()?;
        if records.contains_key(record.id()) {
            return Err(Error::duplicate(R::COLLECTION.name(), record.id()));
        }
        let id = record.id().to_string();
        records.insert(id.clone(), record);
        self.save(&records)?;

        debug!("Created {} record {}", R::COLLECTION, id);
        Ok(())
    }

    /// Delete a record by id, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has the id.
    pub fn delete<R: Record>(&mut self, id: &str) -> Result<R> {
        let mut records = self.load::<R>()?;
        let removed = records
            .remove(id)
            .ok_or_else(|| Error::not_found(R::COLLECTION.name(), id))?;
        self.save(&records)?;

        debug!("Deleted {} record {}", R::COLLECTION, id);
        Ok(removed)
    }

    /// Delete every record matching `predicate`, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn delete_where<R: Record>(&mut self, predicate: impl Fn(&R) -> bool) -> Result<usize> {
        let mut records = self.load::<R>()?;
        let before = records.len();
        records.retain(|_, record| !predicate(record));
        let removed = before - records.len();

        if removed > 0 {
            self.save(&records)?;
            debug!("Deleted {} {} records", removed, R::COLLECTION);
        }
        Ok(removed)
    }

    /// Allocate a fresh id of the form `{prefix}{n}`.
    ///
    /// Numbers come from a persisted per-prefix sequence and are never handed
    /// out twice, even after the record holding one is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection or metadata cannot be read or written.
    pub fn allocate_id<R: Record>(&mut self, prefix: &str) -> Result<String> {
        let existing_max = self
            .load::<R>()?
            .keys()
            .filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        let mut metadata = migrations::load_metadata(self.backend.as_ref())?;
        let sequence_key = format!("{}/{prefix}", R::COLLECTION);
        let last = metadata.sequences.get(&sequence_key).copied().unwrap_or(0);
        let next = last.max(existing_max) + 1;

        metadata.sequences.insert(sequence_key, next);
        migrations::save_metadata(self.backend.as_mut(), &metadata)?;
        Ok(format!("{prefix}{next}"))
    }

    /// Record counts and size of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection cannot be read.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut counts = BTreeMap::new();
        for collection in Collection::ALL {
            let records: BTreeMap<String, serde_json::Value> = self.load_raw(*collection)?;
            counts.insert(collection.name().to_string(), records.len());
        }

        let metadata = migrations::load_metadata(self.backend.as_ref())?;
        Ok(StoreStats {
            location: self.location(),
            schema_version: metadata.schema_version,
            counts,
            size_bytes: self.backend.size_bytes(),
        })
    }

    fn check<R: Record>(record: &R) -> Result<()> {
        if record.id().trim().is_empty() {
            return Err(Error::validation(format!(
                "{} record id must not be empty",
                R::COLLECTION
            )));
        }
        record.validate()
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Where the data lives.
    pub location: String,
    /// Schema version of the store.
    pub schema_version: u32,
    /// Records per collection name.
    pub counts: BTreeMap<String, usize>,
    /// Total size of the stored documents in bytes.
    pub size_bytes: u64,
}

impl StoreStats {
    /// Number of records across all collections.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceRecord, AttendanceStatus, Course, Role, User};
    use chrono::NaiveDate;

    fn create_test_store() -> RecordStore {
        RecordStore::open_in_memory().expect("failed to create test store")
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("registrar_store_{tag}_{}", std::process::id()))
    }

    #[test]
    fn test_upsert_then_get_returns_equal_record() {
        let mut store = create_test_store();
        let course = Course::new("C1", "Algorithms", "T1");

        assert!(store.upsert(course.clone()).unwrap());
        assert_eq!(store.get::<Course>("C1").unwrap(), course);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let mut store = create_test_store();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();

        let mut renamed = Course::new("C1", "Advanced Algorithms", "T1");
        renamed.credits = 4;
        assert!(!store.upsert(renamed.clone()).unwrap());

        assert_eq!(store.get::<Course>("C1").unwrap(), renamed);
        assert_eq!(store.count::<Course>().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = create_test_store();
        let err = store.get::<Course>("nope").unwrap_err();
        assert!(err.is_not_found());
        assert!(store.find::<Course>("nope").unwrap().is_none());
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let mut store = create_test_store();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();

        let removed = store.delete::<Course>("C1").unwrap();
        assert_eq!(removed.name, "Algorithms");
        assert!(store.get::<Course>("C1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut store = create_test_store();
        assert!(store.delete::<Course>("C9").unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut store = create_test_store();
        let err = store.upsert(Course::new("", "Algorithms", "T1")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut store = create_test_store();
        store.insert(Course::new("C1", "Algorithms", "T1")).unwrap();
        let err = store.insert(Course::new("C1", "Other", "T2")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.get::<Course>("C1").unwrap().name, "Algorithms");
    }

    #[test]
    fn test_list_with_predicate() {
        let mut store = create_test_store();
        store.upsert(User::new("S1", Role::Student, "s1@c.edu", "Ada")).unwrap();
        store.upsert(User::new("S2", Role::Student, "s2@c.edu", "Bo")).unwrap();
        store.upsert(User::new("T1", Role::Teacher, "t1@c.edu", "Cy")).unwrap();

        let students = store.list(|u: &User| u.role == Role::Student).unwrap();
        let ids: Vec<_> = students.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
        assert_eq!(store.all::<User>().unwrap().len(), 3);
    }

    #[test]
    fn test_attendance_key_prevents_same_day_duplicates() {
        let mut store = create_test_store();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        store
            .upsert(AttendanceRecord::new("C1", "S1", day, AttendanceStatus::Absent, "T1"))
            .unwrap();
        store
            .upsert(AttendanceRecord::new("C1", "S1", day, AttendanceStatus::Present, "T1"))
            .unwrap();

        let records = store
            .list(|r: &AttendanceRecord| r.student_id == "S1" && r.course_id == "C1")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn test_delete_where() {
        let mut store = create_test_store();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();
        store.upsert(Course::new("C2", "Databases", "T1")).unwrap();
        store.upsert(Course::new("C3", "Networks", "T2")).unwrap();

        let removed = store.delete_where(|c: &Course| c.teacher_id == "T1").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count::<Course>().unwrap(), 1);
    }

    #[test]
    fn test_allocate_id_never_reuses() {
        let mut store = create_test_store();
        let first = store.allocate_id::<Course>("X").unwrap();
        assert_eq!(first, "X1");
        store.upsert(Course::new(first.clone(), "A", "T1")).unwrap();

        let second = store.allocate_id::<Course>("X").unwrap();
        assert_eq!(second, "X2");
        store.upsert(Course::new(second.clone(), "B", "T1")).unwrap();

        store.delete::<Course>(&second).unwrap();
        assert_eq!(store.allocate_id::<Course>("X").unwrap(), "X3");
    }

    #[test]
    fn test_allocate_id_skips_existing_ids() {
        let mut store = create_test_store();
        store.upsert(Course::new("X7", "Imported", "T1")).unwrap();
        assert_eq!(store.allocate_id::<Course>("X").unwrap(), "X8");
    }

    #[test]
    fn test_stats() {
        let mut store = create_test_store();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();
        store.upsert(User::new("S1", Role::Student, "s1@c.edu", "Ada")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records(), 2);
        assert_eq!(stats.counts.get("courses"), Some(&1));
        assert_eq!(stats.counts.get("exam_results"), Some(&0));
        assert_eq!(stats.schema_version, migrations::CURRENT_VERSION);
        assert_eq!(stats.location, ":memory:");
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = temp_dir("persist");
        let _ = std::fs::remove_dir_all(&dir);

        {
            let mut store = RecordStore::open(&dir).unwrap();
            store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();
        }

        let store = RecordStore::open(&dir).unwrap();
        assert_eq!(store.get::<Course>("C1").unwrap().name, "Algorithms");
        assert!(dir.join("courses.json").exists());
        assert!(dir.join("_meta.json").exists());
        assert!(store.stats().unwrap().size_bytes > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_compact_json() {
        let dir = temp_dir("compact");
        let _ = std::fs::remove_dir_all(&dir);

        let mut store = RecordStore::open(&dir).unwrap();
        store.set_pretty(false);
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();

        let contents = std::fs::read_to_string(dir.join("courses.json")).unwrap();
        assert!(!contents.contains('\n'));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_collection_is_json_error() {
        let mut backend = MemoryBackend::new();
        migrations::initialize(&mut backend).unwrap();
        backend.write("courses", "not json").unwrap();

        let store = RecordStore::with_backend(Box::new(backend)).unwrap();
        assert!(matches!(
            store.get::<Course>("C1").unwrap_err(),
            Error::Json(_)
        ));
    }
}
