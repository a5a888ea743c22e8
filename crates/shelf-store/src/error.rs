//! Error taxonomy for the content store.
//!
//! Callers map these onto transport responses: `Validation` is the
//! caller's fault, `NotFound`/`FileMissing` are lookup misses, and
//! `Read`/`Persist` mean the durable state is momentarily unavailable
//! and the operation may be retried.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from content store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required creation input missing or empty. No state was changed.
    #[error("invalid content: {0}")]
    Validation(String),

    /// No record with the given id exists. No state was changed.
    #[error("no content with id {0}")]
    NotFound(u64),

    /// The record exists but its backing file is gone. This is the
    /// transient state left behind by a delete whose metadata write failed.
    #[error("backing file for content {id} missing at {}", path.display())]
    FileMissing { id: u64, path: PathBuf },

    /// The record file exists but could not be read or parsed.
    #[error("failed to load record file: {0}")]
    Read(String),

    /// The updated collection could not be written back.
    #[error("failed to persist record file: {0}")]
    Persist(String),
}

impl StoreError {
    /// True for errors where durable state is guaranteed unchanged.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, StoreError::Validation(_) | StoreError::NotFound(_))
    }
}
