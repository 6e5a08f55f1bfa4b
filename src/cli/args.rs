//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Back up photos and videos from an Android phone over ADB
#[derive(Parser, Debug)]
#[command(name = "phone-backup")]
#[command(version = "1.0.0")]
#[command(
    about = "Copy photos/videos from an Android device to a backup folder, skip duplicates by content hash, and organize by year",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backup folder (overrides config)
    #[arg(short, long, global = true)]
    pub folder: Option<PathBuf>,

    /// Path to the adb executable (overrides config)
    #[arg(long, global = true)]
    pub adb_path: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up new files from the device (the default command)
    Backup {
        /// Delete each file from the device after its copy is verified
        #[arg(long)]
        delete_after: bool,
    },

    /// Move backed-up files into year subfolders by capture date
    Organize,

    /// Move files out of the year subfolders back into the backup folder
    Undo,

    /// List connected ADB devices
    Devices,

    /// Rebuild the hash ledger by re-hashing every file in the backup folder
    ///
    /// Use this after the ledger file has been lost or corrupted; the next
    /// backup run will again skip everything already on disk.
    RebuildLedger,

    /// Manage the configuration file
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\phone_backup_tool\config.toml
    /// - Linux/macOS: ~/.config/phone_backup_tool/config.toml
    ///
    /// If no config file exists, a default one will be created.
    Config {
        /// Show the config file path without creating it
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Show the current configuration
    ShowConfig,
}
