//! ContentStore: file-backed store coupling content records to uploads.
//!
//! Layout:
//! ```text
//! {base_path}/
//! ├── contents.json   # JSON array of ContentRecord, insertion order
//! └── uploads/
//!     ├── 1756100000000-poem.txt
//!     └── 1756100000123-photo.jpg
//! ```
//!
//! Every operation re-reads `contents.json` before acting; mutations write
//! the whole collection back through a temp-file-then-rename swap so
//! concurrent readers never see a partial write. Create and delete
//! serialize through one internal mutex, which also owns the id allocator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::{ContentRecord, FileAttachment, NewContent};

/// Everything the transport needs to serve a download: the resolved file
/// path, the original display name, and the declared media type. Actual
/// byte transfer is the transport's job.
#[derive(Debug, Clone)]
pub struct Download {
    pub path: PathBuf,
    pub file_name: String,
    pub mimetype: String,
}

/// Allocates record ids from the wall clock with a sequence fallback.
///
/// A fresh id is `max(now_millis, last_issued + 1, max_persisted + 1)`, so
/// ids stay strictly increasing even when two creates land in the same
/// millisecond or the clock steps backwards.
#[derive(Debug, Default)]
struct IdAllocator {
    last_issued: u64,
}

impl IdAllocator {
    fn next(&mut self, now_millis: u64, max_persisted: u64) -> u64 {
        let id = now_millis
            .max(self.last_issued + 1)
            .max(max_persisted + 1);
        self.last_issued = id;
        id
    }
}

/// File-backed content store.
pub struct ContentStore {
    config: StoreConfig,
    // Guards the load-mutate-persist cycle of create/delete and owns the
    // id allocator. Reads don't take it; the rename-based commit keeps
    // them consistent.
    writer: Mutex<IdAllocator>,
}

impl ContentStore {
    /// Create a store over the given configuration.
    ///
    /// Creates the base and uploads directories if they don't exist; an
    /// absent record file is not an error (it reads as an empty
    /// collection until the first create).
    pub fn new(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.base_path)
            .context("failed to create store base directory")?;
        fs::create_dir_all(config.uploads_dir())
            .context("failed to create uploads directory")?;

        Ok(Self {
            config,
            writer: Mutex::new(IdAllocator::default()),
        })
    }

    /// Create a store at a specific base path.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::with_base_path(path))
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// List all records, optionally keeping only those whose type equals
    /// `kind` exactly (case-sensitive, no partial match). Never mutates.
    pub fn list(&self, kind: Option<&str>) -> Result<Vec<ContentRecord>, StoreError> {
        let records = self.load()?;
        Ok(match kind {
            Some(k) => records.into_iter().filter(|r| r.kind == k).collect(),
            None => records,
        })
    }

    /// Register a new record for an already-staged upload.
    ///
    /// Validates the request, assigns a fresh id and creation date,
    /// appends to the collection and persists it. On a validation error
    /// nothing is written and the staged file is untouched; cleaning it
    /// up is the caller's responsibility.
    pub fn create(&self, new: NewContent) -> Result<ContentRecord, StoreError> {
        new.validate()?;
        let staged = new
            .file
            .ok_or_else(|| StoreError::Validation("file must be uploaded".into()))?;

        let mut alloc = self.writer.lock().unwrap();

        let mut records = self.load()?;
        let max_persisted = records.iter().map(|r| r.id).max().unwrap_or(0);
        let now = Utc::now();
        let id = alloc.next(now.timestamp_millis().max(0) as u64, max_persisted);

        let record = ContentRecord {
            id,
            kind: new.kind,
            title: new.title,
            description: new.description,
            content: new.content,
            file: FileAttachment {
                name: staged.name,
                path: self.relativize(&staged.path),
                mimetype: staged.mimetype,
            },
            date: now.format("%Y-%m-%d").to_string(),
        };

        records.push(record.clone());
        self.persist(&records)?;

        tracing::debug!(id, kind = %record.kind, "content record created");
        Ok(record)
    }

    /// Delete a record and its backing file.
    ///
    /// A backing file that is already gone is tolerated silently; the
    /// invariant being protected is "no orphaned record", not "no
    /// orphaned file". If the metadata write fails after the file was
    /// removed, the record survives pointing at a dead file and the
    /// download path reports it as missing.
    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let _alloc = self.writer.lock().unwrap();

        let mut records = self.load()?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let path = self.resolve(&records[index].file.path);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(id, path = %path.display(), "backing file already absent");
            }
            Err(e) => {
                return Err(StoreError::Persist(format!(
                    "failed to remove {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        records.remove(index);
        self.persist(&records)?;

        tracing::debug!(id, "content record deleted");
        Ok(())
    }

    /// Resolve a record to its downloadable file.
    pub fn fetch_for_download(&self, id: u64) -> Result<Download, StoreError> {
        let records = self.load()?;
        let record = records
            .iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let path = self.resolve(&record.file.path);
        if !path.exists() {
            return Err(StoreError::FileMissing { id, path });
        }

        Ok(Download {
            path,
            file_name: record.file.name.clone(),
            mimetype: record.file.mimetype.clone(),
        })
    }

    /// Read the current collection from the record file.
    fn load(&self) -> Result<Vec<ContentRecord>, StoreError> {
        let path = self.config.records_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StoreError::Read(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| StoreError::Read(format!("{}: {}", path.display(), e)))
    }

    /// Write the full collection back, atomically from a reader's point
    /// of view: write to temp, then rename over the record file.
    fn persist(&self, records: &[ContentRecord]) -> Result<(), StoreError> {
        let path = self.config.records_path();
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Persist(e.to_string()))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .map_err(|e| StoreError::Persist(format!("{}: {}", temp_path.display(), e)))?;
        fs::rename(&temp_path, &path)
            .map_err(|e| StoreError::Persist(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Store paths relative to the base directory when possible so the
    /// data directory can be relocated as a unit.
    fn relativize(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.config.base_path)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Resolve a stored path against the base directory. Absolute stored
    /// paths pass through unchanged.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.config.base_path.join(path)
    }
}
