//! Device transport abstraction
//!
//! The backup engine only ever talks to the device through the [`Transport`]
//! trait, so the real ADB subprocess transport and the in-memory mock used
//! in tests are interchangeable. The trait is deliberately small: list,
//! pull, delete, plus a connectivity probe the CLI runs before starting.

use crate::core::error::Result;
use std::path::Path;

/// A file on the device, as reported by transport enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Device-side path (e.g. "/sdcard/DCIM/Camera/IMG_0001.jpg")
    pub path: String,

    /// Size in bytes, 0 when the transport cannot report it
    pub size: u64,
}

impl RemoteFile {
    /// Create a remote file descriptor
    pub fn new(path: &str, size: u64) -> Self {
        Self {
            path: path.to_string(),
            size,
        }
    }

    /// The file name component of the device-side path
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Operations the backup engine needs from a device
///
/// Any non-success from `pull_file` or `delete_file` is treated as a
/// per-file failure by the engine, never as fatal to the run.
pub trait Transport {
    /// Whether a device is connected and authorized
    fn device_connected(&self) -> Result<bool>;

    /// Enumerate the files in the device's media directory
    ///
    /// Order is the device's enumeration order, not guaranteed sorted.
    fn list_files(&self) -> Result<Vec<RemoteFile>>;

    /// Copy a device file to a local path
    fn pull_file(&self, remote_path: &str, local_path: &Path) -> Result<()>;

    /// Delete a file on the device
    fn delete_file(&self, remote_path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_name() {
        let file = RemoteFile::new("/sdcard/DCIM/Camera/IMG_0001.jpg", 1024);
        assert_eq!(file.name(), "IMG_0001.jpg");

        let bare = RemoteFile::new("IMG_0002.jpg", 0);
        assert_eq!(bare.name(), "IMG_0002.jpg");
    }
}
