//! Report location stores
//!
//! `FileReportLocationStore` keeps the slot in a small file so the last
//! report survives restarts; `MemoryReportLocationStore` is process-local.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::DomainError;
use crate::ports::ReportLocationStore;

/// File-backed single-slot store
#[derive(Debug, Clone)]
pub struct FileReportLocationStore {
    path: PathBuf,
}

impl FileReportLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportLocationStore for FileReportLocationStore {
    fn get(&self) -> Result<Option<String>, DomainError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let location = content.trim();
                Ok((!location.is_empty()).then(|| location.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to read {:?}: {}",
                self.path, e
            ))),
        }
    }

    fn set(&self, location: &str) -> Result<(), DomainError> {
        if location.trim().is_empty() {
            return self.clear();
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                DomainError::Storage(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        fs::write(&self.path, location)
            .map_err(|e| DomainError::Storage(format!("Failed to write {:?}: {}", self.path, e)))
    }

    fn clear(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to remove {:?}: {}",
                self.path, e
            ))),
        }
    }
}

/// In-memory single-slot store
#[derive(Debug, Default)]
pub struct MemoryReportLocationStore {
    slot: Mutex<Option<String>>,
}

impl MemoryReportLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(location.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, DomainError> {
        self.slot
            .lock()
            .map_err(|_| DomainError::Storage("Report location lock poisoned".to_string()))
    }
}

impl ReportLocationStore for MemoryReportLocationStore {
    fn get(&self) -> Result<Option<String>, DomainError> {
        Ok(self.slot()?.clone())
    }

    fn set(&self, location: &str) -> Result<(), DomainError> {
        *self.slot()? = (!location.trim().is_empty()).then(|| location.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report_url");

        let store = FileReportLocationStore::new(&path);
        assert_eq!(store.get().unwrap(), None);

        store.set("http://localhost:8080/relatorio/1").unwrap();
        let reopened = FileReportLocationStore::new(&path);
        assert_eq!(
            reopened.get().unwrap().as_deref(),
            Some("http://localhost:8080/relatorio/1")
        );
    }

    #[test]
    fn test_file_store_empty_location_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportLocationStore::new(dir.path().join("report_url"));

        store.set("http://localhost:8080/relatorio/1").unwrap();
        store.set("").unwrap();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.path().exists());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryReportLocationStore::with_location("a");
        assert_eq!(store.get().unwrap().as_deref(), Some("a"));
        store.set("  ").unwrap();
        assert_eq!(store.get().unwrap(), None);
    }
}
