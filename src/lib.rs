//! Phone Backup Tool Library
//!
//! Copies photos and videos from an Android device to a local backup folder
//! over ADB, skipping files whose content hash is already recorded in a
//! persistent ledger, verifying every copy by re-hashing it, and optionally
//! deleting verified originals from the device. A separate organize pass
//! moves backed-up files into year-named subfolders by EXIF capture date.
//!
//! # Architecture
//!
//! - [`core`] - Configuration, error handling, hashing, the dedup ledger,
//!   the backup engine and the year organizer
//! - [`device`] - Device transport: the ADB subprocess implementation and
//!   an in-memory mock for tests
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use phone_backup_tool::core::engine::{BackupEngine, BackupOptions};
//! use phone_backup_tool::core::ledger::HashLedger;
//! use phone_backup_tool::device::AdbTransport;
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> anyhow::Result<()> {
//!     let transport = AdbTransport::new(PathBuf::from("adb"), "/sdcard/DCIM/Camera");
//!     let mut ledger = HashLedger::load(Path::new("/backups/.backup_ledger.txt"));
//!
//!     let options = BackupOptions {
//!         destination: PathBuf::from("/backups"),
//!         delete_after: false,
//!     };
//!
//!     let mut engine = BackupEngine::new(&transport, &mut ledger);
//!     let report = engine.run(
//!         &options,
//!         |p| println!("{}/{}: {}", p.index, p.total, p.current),
//!         || false,
//!     )?;
//!
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! # Testing Without a Device
//!
//! [`device::MockTransport`] holds files in memory and can inject pull and
//! delete failures, so the whole engine is testable without a phone or the
//! adb binary.

pub mod cli;
pub mod core;
pub mod device;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
