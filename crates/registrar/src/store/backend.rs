//! Byte-level persistence for the record store.
//!
//! A backend stores named JSON documents. [`DirBackend`] keeps one
//! `<name>.json` file per document in a directory; [`MemoryBackend`] keeps
//! them in a map and is used by tests.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// File extension of persisted documents.
const EXTENSION: &str = "json";

/// Storage for named documents.
pub trait Backend: fmt::Debug + Send {
    /// Human-readable location of the store.
    fn location(&self) -> String;

    /// Read a document. A missing document is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read.
    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Replace a document with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn write(&mut self, name: &str, contents: &str) -> Result<()>;

    /// Total size of all stored documents in bytes.
    fn size_bytes(&self) -> u64;
}

/// Directory of `<name>.json` files.
#[derive(Debug)]
pub struct DirBackend {
    dir: PathBuf,
}

impl DirBackend {
    /// Open a directory backend, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            debug!("Created data directory {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

impl Backend for DirBackend {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                trace!("Read {} bytes from {}", contents.len(), path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::CollectionRead { path, source }),
        }
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{name}.{EXTENSION}.tmp"));

        fs::write(&tmp, contents).map_err(|source| Error::CollectionWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| Error::CollectionWrite {
            path: path.clone(),
            source,
        })?;

        trace!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }

    fn size_bytes(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }
}

/// In-memory documents.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: BTreeMap<String, String>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn location(&self) -> String {
        ":memory:".to_string()
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        Ok(self.documents.get(name).cloned())
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        self.documents.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn size_bytes(&self) -> u64 {
        self.documents.values().map(|d| d.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("registrar_backend_{tag}_{}", std::process::id()))
    }

    #[test]
    fn test_memory_read_missing() {
        let backend = MemoryBackend::new();
        assert!(backend.read("users").unwrap().is_none());
        assert_eq!(backend.location(), ":memory:");
    }

    #[test]
    fn test_memory_write_then_read() {
        let mut backend = MemoryBackend::new();
        backend.write("users", "{}").unwrap();
        assert_eq!(backend.read("users").unwrap().as_deref(), Some("{}"));
        assert_eq!(backend.size_bytes(), 2);
    }

    #[test]
    fn test_dir_creates_directory() {
        let dir = temp_dir("create").join("nested");
        let _ = fs::remove_dir_all(dir.parent().unwrap());

        let backend = DirBackend::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(backend.dir(), dir.as_path());

        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn test_dir_write_then_read() {
        let dir = temp_dir("rw");
        let mut backend = DirBackend::open(&dir).unwrap();

        assert!(backend.read("courses").unwrap().is_none());
        backend.write("courses", r#"{"C1":{}}"#).unwrap();
        assert_eq!(
            backend.read("courses").unwrap().as_deref(),
            Some(r#"{"C1":{}}"#)
        );
        assert!(dir.join("courses.json").exists());
        assert!(!dir.join(".courses.json.tmp").exists());
        assert_eq!(backend.size_bytes(), 9);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_dir_overwrite_replaces_contents() {
        let dir = temp_dir("overwrite");
        let mut backend = DirBackend::open(&dir).unwrap();

        backend.write("exams", "first version").unwrap();
        backend.write("exams", "2").unwrap();
        assert_eq!(backend.read("exams").unwrap().as_deref(), Some("2"));

        let _ = fs::remove_dir_all(&dir);
    }
}
