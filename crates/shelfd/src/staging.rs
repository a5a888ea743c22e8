//! Upload staging.
//!
//! The store's create contract takes an already-materialized file; this is
//! the transport-side half that materializes it. Each upload gets a fresh
//! name in the uploads directory, prefixed with the creation timestamp and
//! a sequence number when two uploads land in the same millisecond.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use shelf_store::StagedFile;

/// Write uploaded bytes into the uploads directory under a collision-free
/// name and return the descriptor the store consumes.
///
/// The client filename is reduced to its final path component so uploads
/// cannot escape the uploads directory.
pub fn stage_upload(
    uploads_dir: &Path,
    original_name: &str,
    mimetype: &str,
    data: &[u8],
) -> Result<StagedFile> {
    std::fs::create_dir_all(uploads_dir).context("failed to create uploads directory")?;

    let safe_name = sanitize_name(original_name);
    let millis = Utc::now().timestamp_millis().max(0);

    let mut seq: u32 = 0;
    loop {
        let file_name = if seq == 0 {
            format!("{millis}-{safe_name}")
        } else {
            format!("{millis}-{seq}-{safe_name}")
        };
        let path = uploads_dir.join(&file_name);

        // create_new claims the name atomically; a collision bumps the
        // sequence and retries
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(data)
                    .with_context(|| format!("failed to write upload to {}", path.display()))?;
                return Ok(StagedFile::new(safe_name, path, mimetype));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                seq += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to stage upload at {}", path.display()));
            }
        }
    }
}

/// Keep only the final path component of a client-supplied filename.
fn sanitize_name(original: &str) -> String {
    Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or("upload")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_writes_bytes() {
        let temp_dir = TempDir::new().unwrap();

        let staged = stage_upload(temp_dir.path(), "a.txt", "text/plain", b"hello").unwrap();

        assert_eq!(staged.name, "a.txt");
        assert_eq!(staged.mimetype, "text/plain");
        assert!(staged.path.starts_with(temp_dir.path()));
        assert_eq!(std::fs::read(&staged.path).unwrap(), b"hello");
    }

    #[test]
    fn test_same_name_uploads_get_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();

        let first = stage_upload(temp_dir.path(), "a.txt", "text/plain", b"one").unwrap();
        let second = stage_upload(temp_dir.path(), "a.txt", "text/plain", b"two").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }

    #[test]
    fn test_filename_is_sanitized() {
        let temp_dir = TempDir::new().unwrap();

        let staged =
            stage_upload(temp_dir.path(), "../../etc/passwd", "text/plain", b"x").unwrap();
        assert_eq!(staged.name, "passwd");
        assert!(staged.path.starts_with(temp_dir.path()));

        let staged = stage_upload(temp_dir.path(), "", "text/plain", b"x").unwrap();
        assert_eq!(staged.name, "upload");
    }
}
