//! In-memory mock transport
//!
//! Lets the backup engine be exercised without a phone or the adb binary.
//! Files are byte vectors held in memory; pull and delete failures can be
//! injected per path to simulate flaky cables and read-only storage.

use crate::core::error::{BackupError, Result};
use crate::device::traits::{RemoteFile, Transport};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Mock device holding files in memory
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Remote path -> content, in enumeration order
    files: Vec<(String, Vec<u8>)>,

    /// Paths whose pull should fail
    pull_errors: HashSet<String>,

    /// Paths whose delete should fail
    delete_errors: HashSet<String>,

    /// Record of successful deletes, in order
    deleted: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create an empty mock device
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the device
    pub fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        self.files.push((path.to_string(), data.to_vec()));
        self
    }

    /// Make pulling a path fail
    pub fn with_pull_error(mut self, path: &str) -> Self {
        self.pull_errors.insert(path.to_string());
        self
    }

    /// Make deleting a path fail
    pub fn with_delete_error(mut self, path: &str) -> Self {
        self.delete_errors.insert(path.to_string());
        self
    }

    /// Paths deleted so far, in call order
    pub fn deleted_files(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn device_connected(&self) -> Result<bool> {
        Ok(true)
    }

    fn list_files(&self) -> Result<Vec<RemoteFile>> {
        Ok(self
            .files
            .iter()
            .map(|(path, data)| RemoteFile::new(path, data.len() as u64))
            .collect())
    }

    fn pull_file(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        if self.pull_errors.contains(remote_path) {
            return Err(BackupError::PullError {
                path: remote_path.to_string(),
                message: "simulated pull failure".to_string(),
            });
        }

        let data = self
            .files
            .iter()
            .find(|(path, _)| path == remote_path)
            .map(|(_, data)| data)
            .ok_or_else(|| BackupError::PullError {
                path: remote_path.to_string(),
                message: "no such file on device".to_string(),
            })?;

        fs::write(local_path, data)?;
        Ok(())
    }

    fn delete_file(&self, remote_path: &str) -> Result<()> {
        if self.delete_errors.contains(remote_path) {
            return Err(BackupError::TransportError(format!(
                "simulated delete failure for '{}'",
                remote_path
            )));
        }

        self.deleted.lock().unwrap().push(remote_path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_insertion_order() {
        let mock = MockTransport::new()
            .with_file("/dcim/b.jpg", b"b")
            .with_file("/dcim/a.jpg", b"a");

        let files = mock.list_files().unwrap();
        assert_eq!(files[0].path, "/dcim/b.jpg");
        assert_eq!(files[1].path, "/dcim/a.jpg");
        assert_eq!(files[1].size, 1);
    }

    #[test]
    fn test_pull_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new().with_file("/dcim/a.jpg", b"hello");

        let local = dir.path().join("a.jpg");
        mock.pull_file("/dcim/a.jpg", &local).unwrap();
        assert_eq!(fs::read(&local).unwrap(), b"hello");
    }

    #[test]
    fn test_pull_unknown_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new();
        let err = mock
            .pull_file("/dcim/missing.jpg", &dir.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, BackupError::PullError { .. }));
    }

    #[test]
    fn test_injected_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockTransport::new()
            .with_file("/dcim/a.jpg", b"a")
            .with_pull_error("/dcim/a.jpg")
            .with_delete_error("/dcim/a.jpg");

        assert!(mock.pull_file("/dcim/a.jpg", &dir.path().join("a")).is_err());
        assert!(mock.delete_file("/dcim/a.jpg").is_err());
        assert!(mock.deleted_files().is_empty());
    }
}
