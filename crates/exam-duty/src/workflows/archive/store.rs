use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use super::document::DutyDocument;

/// Where the session document lives between runs.
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<DutyDocument>, StoreError>;
    fn save(&self, document: &DutyDocument) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored document at {path} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Option<DutyDocument>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no data file yet");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error("read", &self.path, err)),
        };

        let document: DutyDocument =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        info!(
            path = %self.path.display(),
            teachers = document.teachers.len(),
            slots = document.timetable.len(),
            "data file loaded"
        );
        Ok(Some(document))
    }

    fn save(&self, document: &DutyDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error("create", parent, err))?;
        }

        let content = document.to_json().map_err(StoreError::Serialize)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|err| self.io_error("write", &tmp_path, err))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| self.io_error("replace", &self.path, err))?;

        debug!(
            path = %self.path.display(),
            slots = document.timetable.len(),
            allocations = document.allocations.len(),
            "data file saved"
        );
        Ok(())
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<DutyDocument>>,
    fail_saves: Mutex<bool>,
}

impl MemoryStore {
    pub fn with_document(document: DutyDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            fail_saves: Mutex::new(false),
        }
    }

    pub fn snapshot(&self) -> Option<DutyDocument> {
        self.document
            .lock()
            .ok()
            .and_then(|document| document.clone())
    }

    /// Makes every following save fail, to exercise rollback paths.
    pub fn fail_saves(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_saves.lock() {
            *flag = fail;
        }
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Option<DutyDocument>, StoreError> {
        self.document
            .lock()
            .map(|document| document.clone())
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }

    fn save(&self, document: &DutyDocument) -> Result<(), StoreError> {
        let failing = self
            .fail_saves
            .lock()
            .map(|flag| *flag)
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        if failing {
            return Err(StoreError::Unavailable("saves disabled".to_string()));
        }

        let mut slot = self
            .document
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        *slot = Some(document.clone());
        Ok(())
    }
}
