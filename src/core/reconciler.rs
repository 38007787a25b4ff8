//! Reconciliation driver.
//!
//! One sequential pass: fetch storage map, fetch catalog, then for each
//! recording resolve its file, derive its identity and emit artifacts.
//! Sweeps run after every record has been handled.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use tracing::{debug, info, instrument, warn};

use crate::adapters::CatalogSource;
use crate::domain::{CatalogRecord, FileStem, StorageMap};

use super::emitter::{EmitError, Emitter};
use super::fs::Filesystem;
use super::identity::{build_stem, build_title};
use super::nfo::{NfoDocument, NFO_EXTENSION};
use super::resolver::{resolve, ResolvedRecording};
use super::sweeper::{SweepReport, Sweeper};

/// Recording group skipped when nothing else is configured
pub const DEFAULT_SKIP_GROUPS: &str = "LiveTV";

/// Engine parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Recording groups to ignore, lowercased
    skip_groups: Vec<String>,

    /// Presentation directory; enables symlinks with readable names
    target_dir: Option<PathBuf>,

    /// Log actions instead of performing them
    dry_run: bool,
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recording groups to skip (compared case-insensitively)
    pub fn with_skip_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skip_groups = groups
            .into_iter()
            .map(|g| g.as_ref().trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
        self
    }

    /// Parse a comma-separated skip list
    pub fn with_skip_list(self, list: &str) -> Self {
        self.with_skip_groups(list.split(','))
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn skip_groups(&self) -> &[String] {
        &self.skip_groups
    }

    pub fn target_dir(&self) -> Option<&Path> {
        self.target_dir.as_deref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether records of this recording group are ignored
    pub fn skips(&self, recording_group: &str) -> bool {
        let group = recording_group.trim().to_lowercase();
        self.skip_groups.iter().any(|g| *g == group)
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Recorded entries in the catalog
    pub recordings: usize,
    /// Entries ignored because of their recording group
    pub skipped: usize,
    /// Entries whose file was found nowhere
    pub unresolved: usize,
    pub metadata_created: usize,
    pub symlinks_created: usize,
    /// Entries whose artifacts could not be written
    pub failed: usize,
    pub symlinks_removed: usize,
    pub metadata_removed: usize,
    pub sweep_failures: usize,
}

impl ReconcileReport {
    /// Artifacts created plus artifacts removed
    pub fn changes(&self) -> usize {
        self.metadata_created + self.symlinks_created + self.symlinks_removed + self.metadata_removed
    }
}

impl Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} recordings ({} skipped, {} not found): {} NFO files and {} symlinks created, \
             {} orphaned NFO files and {} broken symlinks deleted",
            self.recordings,
            self.skipped,
            self.unresolved,
            self.metadata_created,
            self.symlinks_created,
            self.metadata_removed,
            self.symlinks_removed,
        )?;
        if self.failed > 0 || self.sweep_failures > 0 {
            write!(
                f,
                ", {} recordings failed, {} cleanup errors",
                self.failed, self.sweep_failures
            )?;
        }
        Ok(())
    }
}

/// Reconciles the catalog against a filesystem
#[derive(Debug)]
pub struct Reconciler<'a, F: ?Sized, Tz = Local> {
    fs: &'a F,
    options: ReconcileOptions,
    tz: Tz,
}

impl<'a, F: Filesystem + ?Sized> Reconciler<'a, F, Local> {
    /// Reconciler rendering dates in the local timezone
    pub fn new(fs: &'a F, options: ReconcileOptions) -> Self {
        Self {
            fs,
            options,
            tz: Local,
        }
    }
}

impl<'a, F, Tz> Reconciler<'a, F, Tz>
where
    F: Filesystem + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Render dates and file stems in another timezone
    pub fn with_timezone<T2: TimeZone>(self, tz: T2) -> Reconciler<'a, F, T2> {
        Reconciler {
            fs: self.fs,
            options: self.options,
            tz,
        }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Fetch both upstream documents and reconcile.
    ///
    /// A failed fetch aborts before anything on disk is touched.
    #[instrument(skip_all, fields(source = source.name()))]
    pub async fn run<S: CatalogSource + ?Sized>(&self, source: &S) -> Result<ReconcileReport> {
        let storage = source
            .storage_map()
            .await
            .context("Failed to fetch storage group directories")?;
        debug!(groups = storage.len(), "Fetched storage groups");

        let records = source
            .recordings()
            .await
            .context("Failed to fetch recorded programs")?;
        info!("Found {} recordings", records.len());

        self.reconcile(&storage, &records)
    }

    /// Emit artifacts for every record, then sweep orphans
    pub fn reconcile(
        &self,
        storage: &StorageMap,
        records: &[CatalogRecord],
    ) -> Result<ReconcileReport> {
        if let Some(target) = &self.options.target_dir {
            if !self.fs.exists(target) {
                anyhow::bail!("Target directory does not exist: {}", target.display());
            }
        }

        let mut report = ReconcileReport {
            recordings: records.len(),
            ..Default::default()
        };

        for record in records {
            if self.options.skips(&record.recording_group) {
                debug!(file = %record.file_name, group = %record.recording_group, "Skipping recording group");
                report.skipped += 1;
                continue;
            }

            let Some(directory) = resolve(self.fs, record, storage) else {
                debug!(
                    file = %record.file_name,
                    storage_group = %record.storage_group,
                    "Recording file not found, skipping"
                );
                report.unresolved += 1;
                continue;
            };

            let resolved = ResolvedRecording {
                record: record.clone(),
                directory: directory.to_path_buf(),
            };

            if let Err(e) = self.emit(&resolved, &mut report) {
                warn!(file = %record.file_name, error = %e, "Failed to write artifacts");
                report.failed += 1;
            }
        }

        self.sweep(storage, &mut report);

        Ok(report)
    }

    fn emit(&self, resolved: &ResolvedRecording, report: &mut ReconcileReport) -> Result<(), EmitError> {
        let record = &resolved.record;
        let emitter = Emitter::new(self.fs).dry_run(self.options.dry_run);
        let title = build_title(record);
        let document = NfoDocument::from_record(record, &title, &self.tz);
        let time = record.artifact_time();
        let source = resolved.source_path();

        let nfo_path = match &self.options.target_dir {
            Some(target) => {
                let stem = build_stem(record, &title, &self.tz);
                let link = target.join(link_name(&stem, &record.file_name));

                if emitter.emit_symlink(&source, &link, time)?.is_new() {
                    report.symlinks_created += 1;
                }

                target.join(format!("{}.{}", stem, NFO_EXTENSION))
            }
            None => FileStem::of(&source).with_extension(NFO_EXTENSION),
        };

        if emitter.emit_metadata(&nfo_path, &document, time)?.is_new() {
            report.metadata_created += 1;
        }

        Ok(())
    }

    fn sweep(&self, storage: &StorageMap, report: &mut ReconcileReport) {
        let sweeper = Sweeper::new(self.fs).dry_run(self.options.dry_run);
        let mut symlinks = SweepReport::default();
        let mut metadata = SweepReport::default();

        match &self.options.target_dir {
            Some(target) => {
                // Broken links first so their stems no longer keep NFO files alive
                symlinks.merge(sweeper.sweep_broken_symlinks(target));
                metadata.merge(sweeper.sweep_orphaned_metadata_after(target, &symlinks.removed));
            }
            None => {
                for dir in storage.all_directories() {
                    metadata.merge(sweeper.sweep_orphaned_metadata(dir));
                }
            }
        }

        report.symlinks_removed = symlinks.removed.len();
        report.metadata_removed = metadata.removed.len();
        report.sweep_failures = symlinks.failures + metadata.failures;
    }
}

/// Link file name: readable stem plus the recording's own extension
fn link_name(stem: &str, file_name: &str) -> String {
    match Path::new(file_name).extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
        None => stem.to_string(),
    }
}
