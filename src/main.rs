//! Phone Backup Tool - CLI Entry Point
//!
//! Backs up photos and videos from an Android device over ADB and organizes
//! them by year. This binary is a thin wrapper around the library, handling
//! argument parsing, logging setup, and command dispatch.

use anyhow::Result;
use clap::Parser;
use env_logger::Builder;
use phone_backup_tool::cli::{self, Args};
use phone_backup_tool::core::config::Config;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(ref config_path) = args.config {
        match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        }
    } else {
        Config::load_default().unwrap_or_default()
    };

    // Apply CLI overrides to config
    if let Some(ref folder) = args.folder {
        config.set_backup_folder(folder.clone());
    }
    if let Some(ref adb_path) = args.adb_path {
        config.device.adb_path = adb_path.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    // Set up graceful shutdown handler
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        if shutdown_flag_clone.load(Ordering::SeqCst) {
            // Second Ctrl+C - force exit
            eprintln!("\nForce shutdown requested. Exiting immediately...");
            std::process::exit(1);
        } else {
            shutdown_flag_clone.store(true, Ordering::SeqCst);
            eprintln!("\nGraceful shutdown requested. Finishing current file... (Press Ctrl+C again to force quit)");
        }
    })
    .expect("Failed to set Ctrl+C handler");

    // Initialize logger
    Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    info!("Phone Backup Tool v{}", env!("CARGO_PKG_VERSION"));

    // Run the command
    cli::run_command(&args, &config, shutdown_flag)?;

    Ok(())
}
