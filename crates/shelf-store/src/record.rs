//! Record types for the content store.
//!
//! `ContentRecord` is the unit of durable storage; the record file holds a
//! JSON array of them in insertion order. `NewContent` is what the
//! transport hands to `create` after it has materialized the upload.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One metadata entry describing an uploaded asset.
///
/// Records are never mutated after creation; there is no update operation
/// in this domain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentRecord {
    /// Unique identifier, monotonically increasing. The sole external
    /// handle for delete and download.
    pub id: u64,

    /// Short category string, used only for exact-match filtering.
    #[serde(rename = "type")]
    pub kind: String,

    /// Display title.
    pub title: String,

    /// Free-text description.
    pub description: String,

    /// Optional free-text body.
    #[serde(default)]
    pub content: String,

    /// The backing file for this record.
    pub file: FileAttachment,

    /// Human-readable creation date, fixed at creation time.
    pub date: String,
}

/// Descriptor of a record's backing file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileAttachment {
    /// Original client-side filename, used as the download display name.
    pub name: String,

    /// Location of the persisted binary, relative to the store base
    /// directory when the file lives under it.
    pub path: PathBuf,

    /// Client-declared media type.
    pub mimetype: String,
}

/// An upload already materialized on disk by the transport layer.
///
/// The store only consumes the end result of an upload: bytes at a known
/// path with a known original name and media type. Receiving and staging
/// the byte stream is the transport's job, as is cleaning the staged file
/// up if the store rejects the create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedFile {
    /// Original client-side filename.
    pub name: String,

    /// Where the transport wrote the bytes.
    pub path: PathBuf,

    /// Client-declared media type.
    pub mimetype: String,
}

impl StagedFile {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            mimetype: mimetype.into(),
        }
    }
}

/// Creation request consumed by [`crate::ContentStore::create`].
#[derive(Clone, Debug)]
pub struct NewContent {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub file: Option<StagedFile>,
}

impl NewContent {
    /// Create a request with the required text fields.
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
            content: String::new(),
            file: None,
        }
    }

    /// Builder: set the optional body text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: attach the staged upload.
    pub fn with_file(mut self, file: StagedFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Check the creation preconditions: non-empty kind, title and
    /// description, and a staged file present.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.kind.is_empty() {
            return Err(StoreError::Validation("type must not be empty".into()));
        }
        if self.title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        if self.description.is_empty() {
            return Err(StoreError::Validation(
                "description must not be empty".into(),
            ));
        }
        if self.file.is_none() {
            return Err(StoreError::Validation("file must be uploaded".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let staged = StagedFile::new("a.txt", "uploads/1-a.txt", "text/plain");
        let new = NewContent::new("poem", "T1", "D1")
            .with_content("body")
            .with_file(staged.clone());

        assert_eq!(new.kind, "poem");
        assert_eq!(new.content, "body");
        assert_eq!(new.file, Some(staged));
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let staged = StagedFile::new("a.txt", "uploads/1-a.txt", "text/plain");

        assert!(NewContent::new("", "T", "D")
            .with_file(staged.clone())
            .validate()
            .is_err());
        assert!(NewContent::new("poem", "", "D")
            .with_file(staged.clone())
            .validate()
            .is_err());
        assert!(NewContent::new("poem", "T", "")
            .with_file(staged)
            .validate()
            .is_err());
        assert!(NewContent::new("poem", "T", "D").validate().is_err());
    }

    #[test]
    fn test_record_serializes_kind_as_type() {
        let record = ContentRecord {
            id: 1,
            kind: "poem".into(),
            title: "T".into(),
            description: "D".into(),
            content: String::new(),
            file: FileAttachment {
                name: "a.txt".into(),
                path: PathBuf::from("uploads/1-a.txt"),
                mimetype: "text/plain".into(),
            },
            date: "2026-08-25".into(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "poem");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_record_content_defaults_to_empty() {
        let json = r#"{
            "id": 5,
            "type": "note",
            "title": "T",
            "description": "D",
            "file": {"name": "n", "path": "uploads/n", "mimetype": "text/plain"},
            "date": "2026-08-25"
        }"#;

        let record: ContentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content, "");
        assert_eq!(record.kind, "note");
    }
}
