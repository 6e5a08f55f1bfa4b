//! Year-based organization of the backup folder
//!
//! The backup engine drops files flat into the backup folder; this module
//! moves them into year-named subdirectories ("2023", "2024", ...) using the
//! capture year from [`crate::core::metadata`]. Files whose year cannot be
//! determined land in an "Unknown" bucket.
//!
//! Only files directly under the folder are considered, which makes the pass
//! idempotent: once a file sits inside a bucket it is out of scope for the
//! next run. `undo` reverses the operation by flattening every bucket back
//! into the folder root.

use crate::core::error::{BackupError, Result};
use crate::core::metadata;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Bucket name for files without a determinable capture year
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Outcome of an organize or undo pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    /// Files moved into (or out of) a bucket
    pub moved: usize,

    /// Files that went to the "Unknown" bucket because metadata
    /// extraction failed
    pub unknown: usize,

    /// Files that could not be moved
    pub failed: usize,
}

impl std::fmt::Display for OrganizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Moved: {}, Unknown year: {}, Failed: {}",
            self.moved, self.unknown, self.failed
        )
    }
}

/// Move every file directly under `folder` into a year-named bucket
pub fn organize(folder: &Path) -> Result<OrganizeReport> {
    organize_with(folder, metadata::capture_year)
}

/// Organize with a caller-supplied year extractor
///
/// [`organize`] passes [`metadata::capture_year`]; tests inject extractors
/// that fail on demand to exercise the "Unknown" bucket.
pub fn organize_with<F>(folder: &Path, year_of: F) -> Result<OrganizeReport>
where
    F: Fn(&Path) -> Option<i32>,
{
    if !folder.is_dir() {
        return Err(BackupError::IoError(format!(
            "Backup folder '{}' does not exist",
            folder.display()
        )));
    }

    let mut report = OrganizeReport::default();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || is_hidden(&path) {
            continue;
        }

        let bucket = match year_of(&path) {
            Some(year) => year.to_string(),
            None => {
                report.unknown += 1;
                UNKNOWN_BUCKET.to_string()
            }
        };

        let bucket_dir = folder.join(&bucket);
        if let Err(e) = fs::create_dir_all(&bucket_dir) {
            return Err(BackupError::IoError(format!(
                "Failed to create bucket '{}': {}",
                bucket_dir.display(),
                e
            )));
        }

        match move_into(&path, &bucket_dir) {
            Ok(dest) => {
                debug!("Moved {} -> {}", path.display(), dest.display());
                report.moved += 1;
            }
            Err(e) => {
                warn!("Failed to move '{}': {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Flatten every bucket back into the folder root and remove the empty buckets
pub fn undo(folder: &Path) -> Result<OrganizeReport> {
    if !folder.is_dir() {
        return Err(BackupError::IoError(format!(
            "Backup folder '{}' does not exist",
            folder.display()
        )));
    }

    let mut report = OrganizeReport::default();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let bucket_dir = entry.path();

        if !bucket_dir.is_dir() || is_hidden(&bucket_dir) {
            continue;
        }

        for file_entry in fs::read_dir(&bucket_dir)? {
            let file_entry = file_entry?;
            let path = file_entry.path();
            if !path.is_file() {
                continue;
            }

            match move_into(&path, folder) {
                Ok(_) => report.moved += 1,
                Err(e) => {
                    warn!("Failed to move '{}' back: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        // Bucket dirs that still hold files (failed moves) are kept
        if let Err(e) = fs::remove_dir(&bucket_dir) {
            debug!("Keeping bucket '{}': {}", bucket_dir.display(), e);
        }
    }

    Ok(report)
}

/// Move a file into a directory, resolving name collisions
fn move_into(path: &Path, dest_dir: &Path) -> std::io::Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"))?;

    let dest = unique_destination(&dest_dir.join(name));
    fs::rename(path, &dest)?;
    Ok(dest)
}

/// Return `path` if it is free, otherwise the first `stem_N.ext` that is
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    let mut counter = 1;
    loop {
        let candidate = if extension.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, extension)
        };
        let candidate = parent.join(candidate);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Dotfiles (the ledger, editor droppings) are never organized
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    fn touch(path: &Path) {
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_organize_buckets_by_modified_year() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let report = organize(dir.path()).unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(report.failed, 0);

        // No EXIF in the test files, so the modified-time year applies
        let year = Utc::now().year().to_string();
        assert!(dir.path().join(&year).join("a.jpg").is_file());
        assert!(dir.path().join(&year).join("b.jpg").is_file());
    }

    #[test]
    fn test_failed_year_extraction_goes_to_unknown_bucket() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let report = organize_with(dir.path(), |_| None).unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(report.unknown, 2);
        assert_eq!(report.failed, 0);
        assert!(dir.path().join(UNKNOWN_BUCKET).join("a.jpg").is_file());
        assert!(dir.path().join(UNKNOWN_BUCKET).join("b.jpg").is_file());
    }

    #[test]
    fn test_unknown_bucket_only_for_failed_extractions() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("dated.jpg"));
        touch(&dir.path().join("undated.jpg"));

        let year_of = |path: &Path| {
            (path.file_name() == Some("dated.jpg".as_ref())).then_some(2021)
        };
        let report = organize_with(dir.path(), year_of).unwrap();

        assert_eq!(report.moved, 2);
        assert_eq!(report.unknown, 1);
        assert!(dir.path().join("2021").join("dated.jpg").is_file());
        assert!(dir.path().join(UNKNOWN_BUCKET).join("undated.jpg").is_file());
    }

    #[test]
    fn test_organize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));

        let first = organize(dir.path()).unwrap();
        assert_eq!(first.moved, 1);

        let second = organize(dir.path()).unwrap();
        assert_eq!(second.moved, 0);
        assert_eq!(second.failed, 0);
    }

    #[test]
    fn test_organize_skips_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".backup_ledger.txt"));

        let report = organize(dir.path()).unwrap();
        assert_eq!(report.moved, 0);
        assert!(dir.path().join(".backup_ledger.txt").is_file());
    }

    #[test]
    fn test_organize_resolves_name_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let year = Utc::now().year().to_string();
        fs::create_dir(dir.path().join(&year)).unwrap();
        touch(&dir.path().join(&year).join("a.jpg"));
        touch(&dir.path().join("a.jpg"));

        let report = organize(dir.path()).unwrap();
        assert_eq!(report.moved, 1);
        assert!(dir.path().join(&year).join("a.jpg").is_file());
        assert!(dir.path().join(&year).join("a_1.jpg").is_file());
    }

    #[test]
    fn test_organize_missing_folder_is_fatal() {
        assert!(organize(Path::new("/nonexistent/backups")).is_err());
    }

    #[test]
    fn test_undo_flattens_buckets() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("2021")).unwrap();
        fs::create_dir(dir.path().join("Unknown")).unwrap();
        touch(&dir.path().join("2021").join("a.jpg"));
        touch(&dir.path().join("Unknown").join("b.jpg"));

        let report = undo(dir.path()).unwrap();
        assert_eq!(report.moved, 2);

        assert!(dir.path().join("a.jpg").is_file());
        assert!(dir.path().join("b.jpg").is_file());
        assert!(!dir.path().join("2021").exists());
        assert!(!dir.path().join("Unknown").exists());
    }

    #[test]
    fn test_undo_resolves_name_collisions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("2021")).unwrap();
        touch(&dir.path().join("2021").join("a.jpg"));
        touch(&dir.path().join("a.jpg"));

        let report = undo(dir.path()).unwrap();
        assert_eq!(report.moved, 1);
        assert!(dir.path().join("a.jpg").is_file());
        assert!(dir.path().join("a_1.jpg").is_file());
    }

    #[test]
    fn test_unique_destination_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");

        assert_eq!(unique_destination(&path), path);

        touch(&path);
        assert_eq!(unique_destination(&path), dir.path().join("a_1.jpg"));

        touch(&dir.path().join("a_1.jpg"));
        assert_eq!(unique_destination(&path), dir.path().join("a_2.jpg"));
    }
}
