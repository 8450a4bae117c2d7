use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::io::data_dir::tasks_path;
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::task::Task;

/// Error type for task persistence
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the task collection lives between runs.
///
/// `read`/`write` report failures; `load_tasks`/`save_tasks` are the
/// best-effort entry points the store uses and never fail.
pub trait TaskStorage {
    fn read(&self) -> Result<Vec<Task>, StorageError>;

    fn write(&mut self, tasks: &[Task]) -> Result<(), StorageError>;

    /// The saved collection, or empty when nothing is saved or it is unreadable.
    fn load_tasks(&self) -> Vec<Task> {
        match self.read() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "task load failed, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the collection. Failures are logged and swallowed.
    fn save_tasks(&mut self, tasks: &[Task]) {
        if let Err(e) = self.write(tasks) {
            warn!(error = %e, "task save failed, keeping in-memory state");
        }
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// `tasks.json` inside the data directory: one pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    data_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: &Path) -> Self {
        JsonFileStorage {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        tasks_path(&self.data_dir)
    }
}

impl TaskStorage for JsonFileStorage {
    fn read(&self) -> Result<Vec<Task>, StorageError> {
        let path = self.path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no task file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                log_recovery(
                    &self.data_dir,
                    RecoveryEntry::new(RecoveryCategory::Read, "task file unreadable")
                        .field("Path", path.display().to_string())
                        .field("Error", e.to_string()),
                );
                return Err(StorageError::Read { path, source: e });
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            log_recovery(
                &self.data_dir,
                RecoveryEntry::new(RecoveryCategory::Parse, "task file is not a task list")
                    .field("Path", path.display().to_string())
                    .field("Error", e.to_string())
                    .body(text.clone()),
            );
            StorageError::Parse { path, source: e }
        })
    }

    fn write(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let path = self.path();
        let mut content = serde_json::to_string_pretty(tasks)?;
        content.push('\n');
        let result = fs::create_dir_all(&self.data_dir)
            .and_then(|_| atomic_write(&path, content.as_bytes()));
        if let Err(e) = result {
            log_recovery(
                &self.data_dir,
                RecoveryEntry::new(RecoveryCategory::Write, "task save failed")
                    .field("Path", path.display().to_string())
                    .field("Error", e.to_string())
                    .body(content),
            );
            return Err(StorageError::Write { path, source: e });
        }
        debug!(count = tasks.len(), path = %path.display(), "tasks saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Storage kept in memory. Clones share the same contents, so a test can keep
/// one handle and give the other to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tasks: Rc<RefCell<Vec<Task>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let storage = Self::default();
        *storage.tasks.borrow_mut() = tasks;
        storage
    }

    /// What the last successful write stored
    pub fn saved(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Make later writes fail with an I/O error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TaskStorage for MemoryStorage {
    fn read(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.saved())
    }

    fn write(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("writes disabled"),
            });
        }
        *self.tasks.borrow_mut() = tasks.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::ops::task_ops::new_task;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample() -> Vec<Task> {
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let mut b = new_task("T-002".into(), "Second", None, today);
        b.hard_deadline = Some(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
        vec![new_task("T-001".into(), "First", None, today), b]
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(tmp.path());
        assert!(storage.read().unwrap().is_empty());
    }

    #[test]
    fn write_then_read() {
        let tmp = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(tmp.path());
        storage.write(&sample()).unwrap();
        assert_eq!(storage.read().unwrap(), sample());
    }

    #[test]
    fn writes_camel_case_and_plain_dates() {
        let tmp = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(tmp.path());
        storage.write(&sample()).unwrap();
        let text = fs::read_to_string(storage.path()).unwrap();
        assert!(text.contains("\"plannedEndDate\": \"2025-05-10\""));
        assert!(text.contains("\"hardDeadline\": \"2025-05-20\""));
        assert!(text.contains("\"hardDeadline\": null"));
        assert!(text.contains("\"autoProgress\": false"));
        assert!(text.contains("\"status\": \"inbox\""));
    }

    #[test]
    fn creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(&tmp.path().join("nested/dir"));
        storage.write(&sample()).unwrap();
        assert_eq!(storage.load_tasks().len(), 2);
    }

    #[test]
    fn corrupt_file_loads_empty_and_is_kept_in_recovery_log() {
        let tmp = TempDir::new().unwrap();
        fs::write(tasks_path(tmp.path()), "{ not json").unwrap();
        let storage = JsonFileStorage::new(tmp.path());

        assert!(matches!(storage.read(), Err(StorageError::Parse { .. })));
        assert!(storage.load_tasks().is_empty());

        let entries = read_recovery_entries(tmp.path(), None);
        assert!(!entries.is_empty());
        assert_eq!(entries[0].category, RecoveryCategory::Parse);
        assert_eq!(entries[0].body, "{ not json");
    }

    #[test]
    fn out_of_range_progress_is_clamped_on_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tasks_path(tmp.path()),
            r#"[
  {"id": "T-001", "title": "a", "status": "ongoing", "progress": 150,
   "startDate": "2025-05-10", "plannedEndDate": "2025-05-12", "createdAt": 1},
  {"id": "T-002", "title": "b", "status": "ongoing", "progress": 300,
   "startDate": "2025-05-10", "plannedEndDate": "2025-05-12", "createdAt": 2},
  {"id": "T-003", "title": "c", "status": "inbox", "progress": -4,
   "startDate": "2025-05-10", "plannedEndDate": "2025-05-12", "createdAt": 3},
  {"id": "T-004", "title": "d", "status": "inbox", "progress": 42.6,
   "startDate": "2025-05-10", "plannedEndDate": "2025-05-12", "createdAt": 4}
]"#,
        )
        .unwrap();

        let tasks = JsonFileStorage::new(tmp.path()).read().unwrap();
        let progress: Vec<u8> = tasks.iter().map(|t| t.progress).collect();
        assert_eq!(progress, vec![100, 100, 0, 43]);
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn write_failure_keeps_payload_in_recovery_log() {
        let tmp = TempDir::new().unwrap();
        // A directory where the task file should be makes the rename fail
        fs::create_dir_all(tasks_path(tmp.path())).unwrap();
        let mut storage = JsonFileStorage::new(tmp.path());

        assert!(matches!(
            storage.write(&sample()),
            Err(StorageError::Write { .. })
        ));
        storage.save_tasks(&sample());

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("\"T-002\""));
    }

    #[test]
    fn memory_storage_shares_contents_between_clones() {
        let storage = MemoryStorage::new();
        let mut handle = storage.clone();
        handle.write(&sample()).unwrap();
        assert_eq!(storage.saved().len(), 2);
        assert_eq!(storage.write_count(), 1);

        storage.set_fail_writes(true);
        assert!(handle.write(&[]).is_err());
        assert_eq!(storage.saved().len(), 2);
    }
}
