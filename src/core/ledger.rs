//! Persistent hash ledger of already-backed-up files
//!
//! The ledger is an append-only UTF-8 text file with one hex content hash per
//! line, loaded fully into memory as a set at startup. A hash present in the
//! ledger means the corresponding file already exists somewhere in the backup
//! tree, so the engine skips it on later runs.
//!
//! Loading fails softly: a missing file is an empty ledger, and an unreadable
//! one is logged as a warning and treated as empty rather than aborting the
//! run. Each successful `add` is flushed to disk immediately so a crash
//! mid-run does not lose already-recorded hashes.

use crate::core::error::{BackupError, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// In-memory set of content hashes backed by an append-only file
#[derive(Debug)]
pub struct HashLedger {
    /// Path to the ledger file
    path: PathBuf,

    /// Hashes loaded from disk plus those added this run
    hashes: HashSet<String>,
}

impl HashLedger {
    /// Load the ledger from a file, treating a missing or unreadable file as empty
    pub fn load(path: &Path) -> Self {
        let hashes = match fs::read_to_string(path) {
            Ok(content) => {
                let set: HashSet<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                debug!("Loaded {} hashes from {}", set.len(), path.display());
                set
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", path.display());
                HashSet::new()
            }
            Err(e) => {
                warn!(
                    "Ledger file '{}' is unreadable ({}). Treating it as empty; \
                     run 'rebuild-ledger' to regenerate it from the backup folder.",
                    path.display(),
                    e
                );
                HashSet::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            hashes,
        }
    }

    /// Rewrite the ledger file from scratch with the given hashes
    ///
    /// Used by the `rebuild-ledger` recovery command. The new set replaces
    /// whatever the file contained before.
    pub fn rewrite<I, S>(path: &Path, hashes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = hashes.into_iter().map(Into::into).collect();

        let mut content = String::new();
        for hash in &set {
            content.push_str(hash);
            content.push('\n');
        }
        fs::write(path, content)
            .map_err(|e| BackupError::LedgerError(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            hashes: set,
        })
    }

    /// Check whether a hash is already recorded
    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    /// Record a hash, appending it to the ledger file
    ///
    /// Insertion is idempotent: a hash already in the set is not written
    /// again. The appended line is flushed before returning.
    pub fn add(&mut self, hash: &str) -> Result<()> {
        if !self.hashes.insert(hash.to_string()) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BackupError::LedgerError(format!("{}: {}", self.path.display(), e)))?;

        writeln!(file, "{}", hash)
            .and_then(|_| file.flush())
            .map_err(|e| BackupError::LedgerError(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }

    /// Number of recorded hashes
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HashLedger::load(&dir.path().join("ledger.txt"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_and_contains() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");

        let mut ledger = HashLedger::load(&path);
        ledger.add("aaa111").unwrap();
        ledger.add("bbb222").unwrap();

        assert!(ledger.contains("aaa111"));
        assert!(ledger.contains("bbb222"));
        assert!(!ledger.contains("ccc333"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_add_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");

        {
            let mut ledger = HashLedger::load(&path);
            ledger.add("aaa111").unwrap();
        }

        let reloaded = HashLedger::load(&path);
        assert!(reloaded.contains("aaa111"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_add_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");

        let mut ledger = HashLedger::load(&path);
        ledger.add("aaa111").unwrap();
        ledger.add("aaa111").unwrap();
        ledger.add("aaa111").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|l| *l == "aaa111").count(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_blank_lines_ignored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, "aaa111\n\n  \nbbb222\n").unwrap();

        let ledger = HashLedger::load(&path);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("aaa111"));
        assert!(ledger.contains("bbb222"));
    }

    #[test]
    fn test_unreadable_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, [0xFFu8, 0xFE, 0x00, 0x9C]).unwrap();

        // Invalid UTF-8 makes read_to_string fail; the ledger starts fresh
        let ledger = HashLedger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, "old111\n").unwrap();

        let ledger = HashLedger::rewrite(&path, ["new111", "new222"]).unwrap();
        assert!(!ledger.contains("old111"));
        assert!(ledger.contains("new111"));

        let reloaded = HashLedger::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(!reloaded.contains("old111"));
    }
}
