//! ADB subprocess transport
//!
//! Talks to the phone by invoking the `adb` executable. The transport treats
//! adb as an opaque command runner: output parsing is limited to the device
//! list and the file listing, everything else is exit-status plus the pulled
//! bytes. A missing or unlaunchable executable maps to
//! [`BackupError::TransportUnavailable`], which is fatal; a failed command
//! for an individual file maps to a per-file error.

use crate::core::error::{BackupError, Result};
use crate::device::traits::{RemoteFile, Transport};
use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Transport over the `adb` command-line tool
#[derive(Debug, Clone)]
pub struct AdbTransport {
    /// Path to the adb executable ("adb" to use PATH)
    adb_path: PathBuf,

    /// Device-side directory to back up
    dcim_path: String,
}

impl AdbTransport {
    /// Create a transport for a device directory
    pub fn new(adb_path: PathBuf, dcim_path: &str) -> Self {
        Self {
            adb_path,
            dcim_path: dcim_path.trim_end_matches('/').to_string(),
        }
    }

    /// Serial numbers of connected, authorized devices
    pub fn devices(&self) -> Result<Vec<String>> {
        let output = self.run(&["devices"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_devices_output(&stdout))
    }

    /// Run adb with the given arguments
    fn run(&self, args: &[&str]) -> Result<Output> {
        trace!("adb {}", args.join(" "));
        Command::new(&self.adb_path)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    BackupError::TransportUnavailable(self.adb_path.clone())
                }
                _ => BackupError::TransportError(e.to_string()),
            })
    }

    /// Run adb, mapping a non-zero exit status to a transport error
    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackupError::TransportError(format!(
                "adb {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }
        Ok(output)
    }
}

impl Transport for AdbTransport {
    fn device_connected(&self) -> Result<bool> {
        Ok(!self.devices()?.is_empty())
    }

    fn list_files(&self) -> Result<Vec<RemoteFile>> {
        // `ls -p` marks directories with a trailing slash so they can be
        // filtered without a second round-trip
        let output = self.run_checked(&["shell", "ls", "-p", &self.dcim_path])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let files = parse_ls_output(&stdout, &self.dcim_path);
        debug!("Listed {} files under {}", files.len(), self.dcim_path);
        Ok(files)
    }

    fn pull_file(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        let local = local_path.to_string_lossy();
        let output = self.run(&["pull", remote_path, &local])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackupError::PullError {
                path: remote_path.to_string(),
                message: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    fn delete_file(&self, remote_path: &str) -> Result<()> {
        self.run_checked(&["shell", "rm", "-f", remote_path])?;
        Ok(())
    }
}

/// Parse the output of `adb devices` into a list of serials
///
/// The output looks like:
/// ```text
/// List of devices attached
/// R58M123ABCD	device
/// emulator-5554	offline
/// ```
/// Only entries in the `device` state count as connected.
fn parse_devices_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            (state == "device").then(|| serial.to_string())
        })
        .collect()
}

/// Parse an `ls -p` listing into remote file descriptors
///
/// Plain `ls` gives no sizes; the engine measures bytes from the pulled
/// data instead, so sizes are reported as 0 here.
fn parse_ls_output(stdout: &str, dcim_path: &str) -> Vec<RemoteFile> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with('/'))
        .map(|name| RemoteFile::new(&format!("{}/{}", dcim_path, name), 0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_output() {
        let stdout = "List of devices attached\nR58M123ABCD\tdevice\nemulator-5554\toffline\n\n";
        assert_eq!(parse_devices_output(stdout), vec!["R58M123ABCD"]);
    }

    #[test]
    fn test_parse_devices_output_unauthorized() {
        let stdout = "List of devices attached\nR58M123ABCD\tunauthorized\n";
        assert!(parse_devices_output(stdout).is_empty());
    }

    #[test]
    fn test_parse_devices_output_empty() {
        assert!(parse_devices_output("List of devices attached\n\n").is_empty());
        assert!(parse_devices_output("").is_empty());
    }

    #[test]
    fn test_parse_ls_output_skips_directories() {
        let stdout = "IMG_0001.jpg\nIMG_0002.jpg\nThumbnails/\n\nVID_0003.mp4\n";
        let files = parse_ls_output(stdout, "/sdcard/DCIM/Camera");

        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/sdcard/DCIM/Camera/IMG_0001.jpg",
                "/sdcard/DCIM/Camera/IMG_0002.jpg",
                "/sdcard/DCIM/Camera/VID_0003.mp4",
            ]
        );
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let transport = AdbTransport::new(PathBuf::from("adb"), "/sdcard/DCIM/Camera/");
        assert_eq!(transport.dcim_path, "/sdcard/DCIM/Camera");
    }
}
