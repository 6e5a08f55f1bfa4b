//! Backup engine
//!
//! Orchestrates the workflow at the heart of the tool: enumerate the files
//! on the device, pull each one to a staging directory, skip the ones whose
//! content hash is already in the ledger, move the rest into the backup
//! folder, verify the copy by re-hashing it, record the hash, and optionally
//! delete the verified original from the device.
//!
//! The engine is deliberately sequential — ADB is a serial bottleneck — and
//! never fails a run because of a single file. Pull failures, verification
//! mismatches and device-delete failures are aggregated into the
//! [`BackupReport`]; only setup problems (destination uncreatable, device
//! enumeration impossible) abort the run. A caller-supplied progress
//! callback fires after every file, and a cancellation check runs between
//! files so a UI or Ctrl+C handler can stop the run at a file boundary.

use crate::core::error::{BackupError, Result};
use crate::core::hash;
use crate::core::ledger::HashLedger;
use crate::core::organizer::unique_destination;
use crate::device::traits::{RemoteFile, Transport};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a single backup run
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Destination folder for verified copies (flat, pre-organization)
    pub destination: PathBuf,

    /// Delete each source file from the device after its copy is verified
    pub delete_after: bool,
}

/// Aggregated outcome of a backup run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Files copied and verified
    pub copied: usize,

    /// Files skipped because their hash was already in the ledger
    pub skipped: usize,

    /// Files that failed to pull or verify
    pub failed: usize,

    /// Source files deleted from the device
    pub deleted: usize,

    /// Verified copies whose device-side delete failed
    pub delete_failed: usize,

    /// Total bytes copied
    pub bytes_copied: u64,

    /// Remote paths of the files that failed, for display
    pub failed_files: Vec<String>,

    /// Whether the run was cancelled before processing every file
    pub cancelled: bool,
}

impl std::fmt::Display for BackupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_mb = self.bytes_copied as f64 / 1_048_576.0;
        write!(
            f,
            "Copied: {}, Skipped: {}, Failed: {}, Deleted from device: {}, \
             Delete failed: {}, Total size: {:.2} MB",
            self.copied, self.skipped, self.failed, self.deleted, self.delete_failed, size_mb
        )
    }
}

/// Snapshot passed to the progress callback after each file
#[derive(Debug)]
pub struct Progress<'a> {
    /// 1-based index of the file just processed
    pub index: usize,

    /// Total files in this run
    pub total: usize,

    /// Remote path of the file just processed
    pub current: &'a str,

    /// Running counts so far
    pub report: &'a BackupReport,
}

/// Outcome of processing one remote file
enum FileOutcome {
    /// File was copied, verified and recorded
    Copied(u64),
    /// File's hash was already in the ledger
    Skipped,
}

/// Backup engine bound to a transport and a hash ledger
///
/// Both collaborators are injected so tests can substitute an in-memory
/// transport and a throwaway ledger.
pub struct BackupEngine<'a, T: Transport> {
    transport: &'a T,
    ledger: &'a mut HashLedger,
}

impl<'a, T: Transport> BackupEngine<'a, T> {
    /// Create an engine over a transport and ledger
    pub fn new(transport: &'a T, ledger: &'a mut HashLedger) -> Self {
        Self { transport, ledger }
    }

    /// Run a backup
    ///
    /// `on_progress` is invoked after each file with running counts;
    /// `cancelled` is checked between files (never mid-file) and ends the
    /// run early when it returns true.
    pub fn run<P, C>(
        &mut self,
        options: &BackupOptions,
        mut on_progress: P,
        cancelled: C,
    ) -> Result<BackupReport>
    where
        P: FnMut(&Progress),
        C: Fn() -> bool,
    {
        // Destination must exist before anything else; failure here is fatal
        fs::create_dir_all(&options.destination).map_err(|e| {
            BackupError::IoError(format!(
                "Failed to create backup folder '{}': {}",
                options.destination.display(),
                e
            ))
        })?;

        let files = self.transport.list_files()?;
        let total = files.len();
        let mut report = BackupReport::default();

        if total == 0 {
            info!("No files on the device, nothing to do");
            return Ok(report);
        }

        info!("Found {} files on the device", total);

        let staging = tempfile::tempdir().map_err(|e| {
            BackupError::IoError(format!("Failed to create staging directory: {}", e))
        })?;

        for (index, file) in files.iter().enumerate() {
            if cancelled() {
                warn!("Cancellation requested, stopping after {} files", index);
                report.cancelled = true;
                break;
            }

            match self.process_file(file, staging.path(), &options.destination) {
                Ok(FileOutcome::Copied(bytes)) => {
                    report.copied += 1;
                    report.bytes_copied += bytes;

                    if options.delete_after {
                        match self.transport.delete_file(&file.path) {
                            Ok(()) => report.deleted += 1,
                            Err(e) => {
                                // The local copy is durable either way
                                warn!("Failed to delete '{}' on device: {}", file.path, e);
                                report.delete_failed += 1;
                            }
                        }
                    }
                }
                Ok(FileOutcome::Skipped) => {
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Skipping '{}' this run: {}", file.path, e);
                    report.failed += 1;
                    report.failed_files.push(file.path.clone());
                }
            }

            on_progress(&Progress {
                index: index + 1,
                total,
                current: &file.path,
                report: &report,
            });
        }

        Ok(report)
    }

    /// Pull, dedup-check, copy and verify one remote file
    fn process_file(
        &mut self,
        file: &RemoteFile,
        staging: &Path,
        destination: &Path,
    ) -> Result<FileOutcome> {
        let name = file.name();
        let temp_path = staging.join(name);

        self.transport.pull_file(&file.path, &temp_path)?;
        if !temp_path.is_file() {
            return Err(BackupError::PullError {
                path: file.path.clone(),
                message: "transport reported success but produced no file".to_string(),
            });
        }

        let source_hash = hash::hash_file(&temp_path)?;

        if self.ledger.contains(&source_hash) {
            debug!("Duplicate (hash {}): {}", &source_hash[..12], file.path);
            let _ = fs::remove_file(&temp_path);
            return Ok(FileOutcome::Skipped);
        }

        let dest_path = unique_destination(&destination.join(name));
        let bytes = fs::copy(&temp_path, &dest_path)?;
        let _ = fs::remove_file(&temp_path);

        verify_copy(&dest_path, &source_hash)?;

        // Flushed to disk immediately so a crash does not lose the entry.
        // A ledger write failure only costs dedup on the next run.
        if let Err(e) = self.ledger.add(&source_hash) {
            warn!("Copied '{}' but could not record its hash: {}", name, e);
        }

        debug!("Copied: {} ({} bytes)", dest_path.display(), bytes);
        Ok(FileOutcome::Copied(bytes))
    }
}

/// Re-hash a fresh copy against the source hash
///
/// On mismatch the copy is removed so the file is retried on the next run;
/// its hash is never recorded.
fn verify_copy(dest: &Path, expected: &str) -> Result<()> {
    let actual = hash::hash_file(dest)?;
    if actual != expected {
        let _ = fs::remove_file(dest);
        return Err(BackupError::HashMismatch {
            path: dest.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
