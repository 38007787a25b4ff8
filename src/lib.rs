//! mythnfo - NFO files and readable symlinks for MythTV recordings
//!
//! Reconciles the recorder's catalog of finished recordings against the
//! directories they live in, writing Kodi/Jellyfin compatible NFO files
//! and, optionally, human-named symlinks in a separate directory.
//!
//! # Architecture
//!
//! Every run is a single sequential pass:
//! - Fetch the storage group map and the recording catalog
//! - Resolve each recording to the directory holding its file
//! - Create missing NFO files (and symlinks); existing ones are kept
//! - Sweep broken symlinks and NFO files whose recording is gone
//!
//! The filesystem itself is the only state: an existing NFO file marks a
//! recording as done.
//!
//! # Modules
//!
//! - `adapters`: MythTV API client (`CatalogSource`)
//! - `core`: Reconciliation engine (resolve, emit, sweep)
//! - `domain`: Data structures (CatalogRecord, StorageMap, FileStem)
//! - `config`: Config file and defaults
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # NFO files next to the recordings
//! mythnfo
//!
//! # Readable symlinks plus NFO files in a separate directory
//! mythnfo --target /srv/media/tv-recordings
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{CatalogSource, FetchError, MythApiClient};
pub use core::{Filesystem, LocalFs, ReconcileOptions, ReconcileReport, Reconciler};
pub use domain::{CastMember, CatalogRecord, FileStem, StorageMap, VideoProps};
