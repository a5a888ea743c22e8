//! Durable content-record store for shelf.
//!
//! Keeps an ordered collection of content records in a single JSON record
//! file, paired with an uploads directory holding one backing file per
//! record. Records and their backing files live and die together: create
//! admits a record only with a materialized upload, delete removes both.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shelf_store::{ContentStore, NewContent, StagedFile, StoreConfig};
//!
//! let store = ContentStore::new(StoreConfig::with_base_path("/var/lib/shelf")).unwrap();
//!
//! let staged = StagedFile::new("poem.txt", "/var/lib/shelf/uploads/123-poem.txt", "text/plain");
//! let record = store
//!     .create(NewContent::new("poem", "Title", "A poem").with_file(staged))
//!     .unwrap();
//!
//! for r in store.list(Some("poem")).unwrap() {
//!     println!("{}: {}", r.id, r.title);
//! }
//! store.delete(record.id).unwrap();
//! ```
//!
//! The store re-reads the record file on every operation and commits writes
//! with a temp-file-then-rename swap, so concurrent readers never observe a
//! partial collection. Mutating operations serialize through one internal
//! lock; callers need no locking of their own.

pub mod config;
pub mod error;
pub mod record;
pub mod store;

// Re-exports for convenience
pub use config::StoreConfig;
pub use error::StoreError;
pub use record::{ContentRecord, FileAttachment, NewContent, StagedFile};
pub use store::{ContentStore, Download};
