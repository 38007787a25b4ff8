//! Create-if-absent emission of NFO files and presentation symlinks.
//!
//! Existence at the target path is the "already reconciled" marker: an
//! existing NFO is never rewritten, so hand-edited files survive reruns.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fs::Filesystem;
use super::nfo::NfoDocument;

/// Errors while emitting one artifact
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to write NFO file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create symlink {path}: {source}")]
    Symlink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to set timestamp on {path}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    /// The artifact was created
    Created,

    /// Something already exists at the target path; left untouched
    AlreadyPresent,

    /// Dry run: the artifact would have been created
    Planned,
}

impl Emitted {
    pub fn is_created(self) -> bool {
        matches!(self, Emitted::Created)
    }

    /// Created, or would have been in a dry run
    pub fn is_new(self) -> bool {
        matches!(self, Emitted::Created | Emitted::Planned)
    }
}

/// Writes artifacts through a `Filesystem`
#[derive(Debug)]
pub struct Emitter<'a, F: ?Sized> {
    fs: &'a F,
    dry_run: bool,
}

impl<'a, F: Filesystem + ?Sized> Emitter<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs, dry_run: false }
    }

    /// Log instead of writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Write `document` to `path` unless a file is already there, then
    /// stamp it with `time`.
    pub fn emit_metadata(
        &self,
        path: &Path,
        document: &NfoDocument,
        time: DateTime<Utc>,
    ) -> Result<Emitted, EmitError> {
        if self.fs.is_file(path) {
            debug!(path = %path.display(), "NFO file already exists");
            return Ok(Emitted::AlreadyPresent);
        }

        if self.dry_run {
            info!(path = %path.display(), "Would create NFO file");
            return Ok(Emitted::Planned);
        }

        match self.fs.create_new(path, &document.render()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Path occupied, not writing NFO file");
                return Ok(Emitted::AlreadyPresent);
            }
            Err(source) => {
                return Err(EmitError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        self.stamp(path, time)?;
        info!("Created NFO file '{}'", path.display());
        Ok(Emitted::Created)
    }

    /// Link `link` to `source` unless `link` already exists, then stamp
    /// the link itself with `time`.
    pub fn emit_symlink(
        &self,
        source: &Path,
        link: &Path,
        time: DateTime<Utc>,
    ) -> Result<Emitted, EmitError> {
        if self.fs.is_symlink(link) || self.fs.exists(link) {
            debug!(link = %link.display(), "Symlink already exists");
            return Ok(Emitted::AlreadyPresent);
        }

        if self.dry_run {
            info!(link = %link.display(), source = %source.display(), "Would create symlink");
            return Ok(Emitted::Planned);
        }

        match self.fs.symlink(source, link) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(Emitted::AlreadyPresent);
            }
            Err(e) => {
                return Err(EmitError::Symlink {
                    path: link.to_path_buf(),
                    source: e,
                })
            }
        }

        self.stamp(link, time)?;
        info!("Created symlink from '{}' to '{}'", source.display(), link.display());
        Ok(Emitted::Created)
    }

    /// Stamp a freshly created artifact; on failure remove it again so the
    /// next run recreates it with the right time.
    fn stamp(&self, path: &Path, time: DateTime<Utc>) -> Result<(), EmitError> {
        let Err(source) = self.fs.set_times(path, time) else {
            return Ok(());
        };

        if let Err(e) = self.fs.remove(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove unstamped artifact");
        }

        Err(EmitError::Timestamp {
            path: path.to_path_buf(),
            source,
        })
    }
}
