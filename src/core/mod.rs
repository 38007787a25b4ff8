//! Reconciliation engine.
//!
//! This module contains:
//! - Fs: Filesystem seam and the local implementation
//! - Resolver: finds a recording's file among storage directories
//! - Identity: titles and readable file stems
//! - Nfo: metadata document rendering
//! - Emitter: create-if-absent NFO files and symlinks
//! - Sweeper: removal of orphaned artifacts
//! - Reconciler: the driver tying it together

pub mod emitter;
pub mod fs;
pub mod identity;
pub mod nfo;
pub mod reconciler;
pub mod resolver;
pub mod sweeper;

// Re-export commonly used types
pub use emitter::{EmitError, Emitted, Emitter};
pub use fs::{Filesystem, LocalFs};
pub use identity::{build_stem, build_title, sanitize_file_name, season_episode_tag};
pub use nfo::{NfoDocument, NFO_EXTENSION};
pub use reconciler::{ReconcileOptions, ReconcileReport, Reconciler, DEFAULT_SKIP_GROUPS};
pub use resolver::{resolve, ResolvedRecording};
pub use sweeper::{SweepReport, Sweeper};
