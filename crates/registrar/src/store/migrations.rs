//! Store initialisation and schema versioning.
//!
//! The `_meta` document records the schema version of the store and the id
//! sequences handed out by [`RecordStore::allocate_id`](super::RecordStore::allocate_id).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::ExamResult;

use super::backend::Backend;
use super::schema::{Collection, EMPTY_COLLECTION, META_NAME};

/// The current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Contents of the `_meta` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Schema version the store was last migrated to.
    pub schema_version: u32,
    /// Last value handed out per id sequence.
    #[serde(default)]
    pub sequences: BTreeMap<String, u64>,
    /// When the metadata was last written.
    pub updated_at: DateTime<Utc>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            schema_version: 0,
            sequences: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Initialize a store.
///
/// Creates every missing collection document, then runs any pending
/// migrations to bring the store up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the store was written by a newer version or if a
/// document cannot be read or written.
pub fn initialize(backend: &mut dyn Backend) -> Result<()> {
    for collection in Collection::ALL {
        if backend.read(collection.name())?.is_none() {
            backend.write(collection.name(), EMPTY_COLLECTION)?;
            debug!("Created empty collection {}", collection);
        }
    }

    let metadata = load_metadata(backend)?;
    if metadata.schema_version > CURRENT_VERSION {
        return Err(Error::SchemaVersion {
            found: metadata.schema_version,
            supported: CURRENT_VERSION,
        });
    }
    if metadata.schema_version < CURRENT_VERSION {
        run_migrations(backend, metadata)?;
    }

    Ok(())
}

/// Read the metadata document. A fresh store reads as version 0.
///
/// # Errors
///
/// Returns an error if the document exists but is not valid metadata.
pub fn load_metadata(backend: &dyn Backend) -> Result<Metadata> {
    match backend.read(META_NAME)? {
        Some(contents) => Ok(serde_json::from_str(&contents)?),
        None => Ok(Metadata::default()),
    }
}

/// Write the metadata document.
///
/// # Errors
///
/// Returns an error if the document cannot be written.
pub fn save_metadata(backend: &mut dyn Backend, metadata: &Metadata) -> Result<()> {
    let mut metadata = metadata.clone();
    metadata.updated_at = Utc::now();
    backend.write(META_NAME, &serde_json::to_string_pretty(&metadata)?)
}

fn run_migrations(backend: &mut dyn Backend, mut metadata: Metadata) -> Result<()> {
    while metadata.schema_version < CURRENT_VERSION {
        let next = metadata.schema_version + 1;
        run_migration(backend, next)?;
        metadata.schema_version = next;
    }

    save_metadata(backend, &metadata)?;
    info!("Store schema at version {}", CURRENT_VERSION);
    Ok(())
}

fn run_migration(backend: &mut dyn Backend, version: u32) -> Result<()> {
    match version {
        1 => migrate_v1(backend),
        2 => migrate_v2(backend),
        _ => Err(Error::SchemaVersion {
            found: version,
            supported: CURRENT_VERSION,
        }),
    }
}

/// Version 1 is the initial layout created by [`initialize`].
#[allow(clippy::unnecessary_wraps)]
fn migrate_v1(_backend: &mut dyn Backend) -> Result<()> {
    Ok(())
}

type Document = BTreeMap<String, Value>;

fn read_document(backend: &dyn Backend, collection: Collection) -> Result<Document> {
    match backend.read(collection.name())? {
        Some(contents) => Ok(serde_json::from_str(&contents)?),
        None => Ok(Document::new()),
    }
}

fn write_document(backend: &mut dyn Backend, collection: Collection, document: &Document) -> Result<()> {
    backend.write(collection.name(), &serde_json::to_string_pretty(document)?)
}

fn str_field(record: &Value, field: &str) -> Option<String> {
    record.get(field)?.as_str().map(str::to_string)
}

/// Version 2 adds departments and subjects.
///
/// Department names already held by users and courses become department
/// records keyed by that name. Free-text exam subjects become subject
/// records, and their results are re-keyed by subject id.
fn migrate_v2(backend: &mut dyn Backend) -> Result<()> {
    let now = Utc::now();

    let mut departments = read_document(backend, Collection::Departments)?;
    for owner in [Collection::Users, Collection::Courses] {
        for record in read_document(backend, owner)?.values() {
            if let Some(name) = str_field(record, "department") {
                departments.entry(name.clone()).or_insert_with(|| {
                    json!({ "id": name, "name": name, "description": "", "created_at": now })
                });
            }
        }
    }
    write_document(backend, Collection::Departments, &departments)?;

    let exams = read_document(backend, Collection::Exams)?;
    let mut subjects = read_document(backend, Collection::Subjects)?;
    let mut subject_ids: BTreeMap<String, String> = subjects
        .iter()
        .filter_map(|(id, subject)| Some((str_field(subject, "name")?, id.clone())))
        .collect();

    let mut results = Document::new();
    for (id, mut result) in read_document(backend, Collection::ExamResults)? {
        let (Some(exam_id), Some(student_id), Some(name)) = (
            str_field(&result, "exam_id"),
            str_field(&result, "student_id"),
            str_field(&result, "subject"),
        ) else {
            results.insert(id, result);
            continue;
        };

        let subject_id = subject_ids
            .entry(name.clone())
            .or_insert_with(|| {
                let mut n = subjects.len() + 1;
                while subjects.contains_key(&format!("SUB{n}")) {
                    n += 1;
                }
                let subject_id = format!("SUB{n}");
                let semester = exams
                    .get(&exam_id)
                    .and_then(|exam| exam.get("semester"))
                    .cloned()
                    .unwrap_or_else(|| json!(1));
                subjects.insert(
                    subject_id.clone(),
                    json!({ "id": subject_id, "name": name, "semester": semester, "created_at": now }),
                );
                subject_id
            })
            .clone();

        let key = ExamResult::key(&exam_id, &student_id, &subject_id);
        if let Some(fields) = result.as_object_mut() {
            fields.remove("subject");
            fields.insert("subject_id".to_string(), Value::String(subject_id));
            fields.insert("id".to_string(), Value::String(key.clone()));
        }
        results.insert(key, result);
    }

    write_document(backend, Collection::Subjects, &subjects)?;
    write_document(backend, Collection::ExamResults, &results)?;
    debug!(
        "Migrated {} departments, {} subjects, {} exam results",
        departments.len(),
        subjects.len(),
        results.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::MemoryBackend;

    #[test]
    fn test_initialize_creates_collections() {
        let mut backend = MemoryBackend::new();
        initialize(&mut backend).unwrap();

        for collection in Collection::ALL {
            assert_eq!(
                backend.read(collection.name()).unwrap().as_deref(),
                Some(EMPTY_COLLECTION)
            );
        }
    }

    #[test]
    fn test_initialize_sets_version() {
        let mut backend = MemoryBackend::new();
        initialize(&mut backend).unwrap();

        assert_eq!(load_metadata(&backend).unwrap().schema_version, CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_idempotent_and_keeps_data() {
        let mut backend = MemoryBackend::new();
        initialize(&mut backend).unwrap();
        backend.write("courses", r#"{"C1":null}"#).unwrap();

        initialize(&mut backend).unwrap();
        assert_eq!(
            backend.read("courses").unwrap().as_deref(),
            Some(r#"{"C1":null}"#)
        );
    }

    #[test]
    fn test_fresh_metadata_is_version_zero() {
        let backend = MemoryBackend::new();
        let metadata = load_metadata(&backend).unwrap();
        assert_eq!(metadata.schema_version, 0);
        assert!(metadata.sequences.is_empty());
    }

    #[test]
    fn test_newer_store_rejected() {
        let mut backend = MemoryBackend::new();
        let metadata = Metadata {
            schema_version: CURRENT_VERSION + 1,
            ..Metadata::default()
        };
        save_metadata(&mut backend, &metadata).unwrap();

        let err = initialize(&mut backend).unwrap_err();
        assert!(matches!(err, Error::SchemaVersion { .. }));
    }

    #[test]
    fn test_run_migration_unknown_version() {
        let mut backend = MemoryBackend::new();
        let err = run_migration(&mut backend, 999).unwrap_err();
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_sequences_survive_save() {
        let mut backend = MemoryBackend::new();
        let mut metadata = Metadata::default();
        metadata.sequences.insert("assignments/C1-A".to_string(), 4);
        save_metadata(&mut backend, &metadata).unwrap();

        let loaded = load_metadata(&backend).unwrap();
        assert_eq!(loaded.sequences.get("assignments/C1-A"), Some(&4));
    }

    #[test]
    fn test_v2_creates_departments_and_subjects() {
        let mut backend = MemoryBackend::new();
        for collection in Collection::ALL {
            backend.write(collection.name(), EMPTY_COLLECTION).unwrap();
        }
        backend
            .write(
                "users",
                r#"{"S1":{"id":"S1","role":"student","email":"s1@college.edu","password_hash":"","name":"Ada","department":"Physics","created_at":"2024-01-01T00:00:00Z"}}"#,
            )
            .unwrap();
        backend
            .write(
                "exams",
                r#"{"EX1":{"id":"EX1","name":"Mid Sem 1","kind":"Mid Sem 1","semester":3,"date":"2024-03-20","max_marks":50,"created_at":"2024-01-01T00:00:00Z"}}"#,
            )
            .unwrap();
        backend
            .write(
                "exam_results",
                r#"{"EX1:S1:Maths":{"id":"EX1:S1:Maths","exam_id":"EX1","student_id":"S1","subject":"Maths","marks":40,"updated_at":"2024-03-21T00:00:00Z"}}"#,
            )
            .unwrap();
        let v1 = Metadata {
            schema_version: 1,
            ..Metadata::default()
        };
        save_metadata(&mut backend, &v1).unwrap();

        let store = crate::store::RecordStore::with_backend(Box::new(backend)).unwrap();

        let physics = store.get::<crate::model::Department>("Physics").unwrap();
        assert_eq!(physics.name, "Physics");

        let subject = store.get::<crate::model::Subject>("SUB1").unwrap();
        assert_eq!(subject.name, "Maths");
        assert_eq!(subject.semester, 3);

        let result = store.get::<ExamResult>("EX1:S1:SUB1").unwrap();
        assert_eq!(result.subject_id, "SUB1");
        assert_eq!(result.marks, 40);
        assert!(store.find::<ExamResult>("EX1:S1:Maths").unwrap().is_none());
    }
}
