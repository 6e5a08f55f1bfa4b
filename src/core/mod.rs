//! Core functionality: configuration, errors, hashing, the dedup ledger,
//! the backup engine, metadata extraction and the year organizer.

pub mod config;
pub mod engine;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod metadata;
pub mod organizer;
