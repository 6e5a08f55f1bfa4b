//! Error types for the phone backup tool
//!
//! Fatal errors abort a run and surface to the caller; per-file errors are
//! caught inside the backup engine and aggregated into the run report.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the phone backup tool
#[derive(Error, Debug)]
pub enum BackupError {
    /// The ADB executable could not be started
    #[error("ADB is not available at '{0}'. Install platform-tools or set device.adb_path.")]
    TransportUnavailable(PathBuf),

    /// No device is connected or authorized
    #[error("No device found. Connect the phone via USB and enable USB debugging.")]
    NoDeviceConnected,

    /// A transport command exited with a failure status
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Pulling a single file from the device failed
    #[error("Failed to pull '{path}': {message}")]
    PullError { path: String, message: String },

    /// Re-hashing the local copy did not reproduce the source hash
    #[error("Hash mismatch after copying '{path}' (expected {expected}, got {actual})")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Appending to the hash ledger failed
    #[error("Ledger error: {0}")]
    LedgerError(String),

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BackupError>;

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::IoError(err.to_string())
    }
}
