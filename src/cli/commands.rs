//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands. Per-file
//! failures are printed in the summary but keep the exit code at 0; only
//! fatal setup errors (no device, uncreatable folder) propagate as errors.

use crate::cli::progress::{self, TransferProgress};
use crate::cli::{Args, Commands};
use crate::core::config::{get_config_path, init_config, Config};
use crate::core::engine::{BackupEngine, BackupOptions, BackupReport};
use crate::core::error::BackupError;
use crate::core::hash;
use crate::core::ledger::HashLedger;
use crate::core::organizer::{self, OrganizeReport};
use crate::device::traits::Transport;
use crate::device::AdbTransport;
use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

/// Run the appropriate command based on CLI arguments
///
/// If initial setup is required (no backup folder configured), the setup
/// prompt runs first for the commands that need a folder.
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    let config = check_and_run_setup_if_needed(args, config)?;

    match &args.command {
        Some(Commands::Backup { delete_after }) => {
            run_backup(&config, *delete_after, shutdown_flag)?;
        }
        None => {
            run_backup(&config, false, shutdown_flag)?;
        }
        Some(Commands::Organize) => {
            run_organize(&config)?;
        }
        Some(Commands::Undo) => {
            run_undo(&config)?;
        }
        Some(Commands::Devices) => {
            list_devices(&config)?;
        }
        Some(Commands::RebuildLedger) => {
            rebuild_ledger(&config)?;
        }
        Some(Commands::Config { path, reset }) => {
            handle_config_command(*path, *reset)?;
        }
        Some(Commands::ShowConfig) => {
            show_config(&config);
        }
    }

    Ok(())
}

/// Check if setup is needed and prompt for the backup folder if so
///
/// Returns the (possibly updated) config to use for the command.
fn check_and_run_setup_if_needed(args: &Args, config: &Config) -> Result<Config> {
    let needs_folder = !matches!(
        &args.command,
        Some(Commands::Devices) | Some(Commands::Config { .. }) | Some(Commands::ShowConfig)
    );

    if !needs_folder || !config.needs_setup() {
        return Ok(config.clone());
    }

    info!("No backup folder configured, running first-time setup");

    let input: String = Input::new()
        .with_prompt("Where should backed-up photos be stored?")
        .interact_text()
        .context("Setup cancelled")?;

    let folder = PathBuf::from(input.trim());
    if folder.as_os_str().is_empty() {
        bail!("Setup cancelled - no backup folder given");
    }

    if !folder.exists() {
        let create = Confirm::new()
            .with_prompt(format!("'{}' doesn't exist. Create it?", folder.display()))
            .default(true)
            .interact()
            .context("Setup cancelled")?;
        if !create {
            bail!("Setup cancelled - backup folder not created");
        }
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create '{}'", folder.display()))?;
    }

    let mut config = config.clone();
    config.set_backup_folder(folder);

    match config.save_default() {
        Ok(path) => progress::print_success(&format!("Saved configuration to {}", path.display())),
        Err(e) => warn!("Could not save configuration: {}", e),
    }

    Ok(config)
}

/// Run the backup engine against the connected device
fn run_backup(config: &Config, delete_after: bool, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    let transport = AdbTransport::new(
        config.device.adb_path.clone(),
        &config.device.dcim_path,
    );

    if !transport.device_connected()? {
        return Err(BackupError::NoDeviceConnected.into());
    }

    let mut ledger = HashLedger::load(&config.ledger_path());
    info!(
        "Ledger has {} known hashes ({})",
        ledger.len(),
        ledger.path().display()
    );

    let options = BackupOptions {
        destination: config.backup.folder.clone(),
        delete_after: delete_after || config.backup.delete_after,
    };

    if options.delete_after {
        progress::print_warning("Verified files will be deleted from the device");
    }

    let bar = TransferProgress::new();
    let mut engine = BackupEngine::new(&transport, &mut ledger);
    let report = engine.run(
        &options,
        |p| bar.update(p.index, p.total, p.current),
        || shutdown_flag.load(Ordering::SeqCst),
    )?;

    bar.finish(if report.cancelled {
        "Backup interrupted"
    } else {
        "Backup complete"
    });

    print_backup_summary(&report);
    Ok(())
}

/// Print the per-run summary and the failed paths, if any
fn print_backup_summary(report: &BackupReport) {
    println!();
    progress::print_success(&format!("{}", report));

    if report.delete_failed > 0 {
        progress::print_warning(&format!(
            "{} file(s) could not be deleted from the device (copies are safe)",
            report.delete_failed
        ));
    }

    if !report.failed_files.is_empty() {
        progress::print_warning(&format!(
            "{} file(s) failed and will be retried on the next run:",
            report.failed_files.len()
        ));
        for path in &report.failed_files {
            progress::print_error(path);
        }
    }
}

/// Organize the backup folder into year buckets
fn run_organize(config: &Config) -> Result<()> {
    let folder = &config.backup.folder;
    info!("Organizing {} by capture year", folder.display());

    let bar = progress::spinner("Reading capture dates...");
    let report = organizer::organize(folder)?;
    bar.finish_and_clear();

    print_organize_summary("Organized", &report);
    Ok(())
}

/// Flatten the year buckets back into the backup folder
fn run_undo(config: &Config) -> Result<()> {
    let folder = &config.backup.folder;
    info!("Undoing organization of {}", folder.display());

    let report = organizer::undo(folder)?;
    print_organize_summary("Restored", &report);
    Ok(())
}

fn print_organize_summary(verb: &str, report: &OrganizeReport) {
    progress::print_success(&format!("{}: {}", verb, report));
    if report.failed > 0 {
        progress::print_warning(&format!("{} file(s) could not be moved", report.failed));
    }
}

/// List connected ADB devices
fn list_devices(config: &Config) -> Result<()> {
    let transport = AdbTransport::new(
        config.device.adb_path.clone(),
        &config.device.dcim_path,
    );

    let devices = transport.devices()?;
    if devices.is_empty() {
        progress::print_warning("No devices connected (check USB debugging is enabled)");
    } else {
        progress::print_info(&format!("{} device(s) connected:", devices.len()));
        for serial in devices {
            progress::print_success(&serial);
        }
    }
    Ok(())
}

/// Rebuild the hash ledger from the backup folder contents
fn rebuild_ledger(config: &Config) -> Result<()> {
    let folder = &config.backup.folder;
    if !folder.is_dir() {
        bail!("Backup folder '{}' does not exist", folder.display());
    }

    let bar = progress::spinner("Hashing backup folder...");
    let (hashes, errors) = hash_backup_tree(folder);
    let ledger = HashLedger::rewrite(&config.ledger_path(), hashes)?;
    bar.finish_and_clear();

    progress::print_success(&format!(
        "Ledger rebuilt with {} unique hashes ({})",
        ledger.len(),
        ledger.path().display()
    ));
    if errors > 0 {
        progress::print_warning(&format!("{} file(s) could not be hashed", errors));
    }
    Ok(())
}

/// Hash every visible file under the backup folder
///
/// Hidden entries are pruned at every depth (the root itself is exempt so a
/// dot-named backup folder still works), matching what the backup and
/// organize passes manage: the ledger file and thumbnail caches never feed
/// the rebuilt ledger. Returns the hashes and the unhashable-file count.
fn hash_backup_tree(folder: &Path) -> (Vec<String>, usize) {
    let mut hashes = Vec::new();
    let mut errors = 0usize;

    let walker = WalkDir::new(folder)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_name(e.file_name()));

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match hash::hash_file(path) {
            Ok(hash) => {
                debug!("{}  {}", &hash[..12], path.display());
                hashes.push(hash);
            }
            Err(e) => {
                warn!("Could not hash '{}': {}", path.display(), e);
                errors += 1;
            }
        }
    }

    (hashes, errors)
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

/// Handle the config subcommand
fn handle_config_command(path_only: bool, reset: bool) -> Result<()> {
    if path_only {
        match get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("Could not determine configuration directory"),
        }
        return Ok(());
    }

    if reset {
        let path = get_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine configuration directory"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, Config::generate_default_config())?;
        progress::print_success(&format!("Reset configuration at {}", path.display()));
        return Ok(());
    }

    let path = init_config()?;
    progress::print_info(&format!("Configuration file: {}", path.display()));
    Ok(())
}

/// Print the active configuration as TOML
fn show_config(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(content) => print!("{}", content),
        Err(e) => progress::print_error(&format!("Failed to render configuration: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_backup_tree_skips_hidden_entries_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join(".backup_ledger.txt"), b"stale\n").unwrap();
        fs::create_dir(dir.path().join(".thumbnails")).unwrap();
        fs::write(dir.path().join(".thumbnails").join("x.jpg"), b"thumb").unwrap();
        fs::create_dir(dir.path().join("2023")).unwrap();
        fs::write(dir.path().join("2023").join("b.jpg"), b"b").unwrap();

        let (mut hashes, errors) = hash_backup_tree(dir.path());
        assert_eq!(errors, 0);

        let mut expected = vec![hash::hash_bytes(b"a"), hash::hash_bytes(b"b")];
        hashes.sort();
        expected.sort();
        assert_eq!(hashes, expected);
    }

    #[test]
    fn test_hash_backup_tree_allows_hidden_root_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".backups");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.jpg"), b"a").unwrap();

        let (hashes, errors) = hash_backup_tree(&root);
        assert_eq!(errors, 0);
        assert_eq!(hashes, vec![hash::hash_bytes(b"a")]);
    }
}
