//! Device interaction
//!
//! [`traits::Transport`] is the seam between the backup engine and the
//! outside world: [`adb::AdbTransport`] drives a real phone through the adb
//! subprocess, [`mock::MockTransport`] stands in for it in tests.

pub mod adb;
pub mod mock;
pub mod traits;

pub use adb::AdbTransport;
pub use mock::MockTransport;
pub use traits::{RemoteFile, Transport};
