//! Mark-and-sweep removal of orphaned artifacts.
//!
//! Two passes, each best-effort per entry:
//! - broken symlinks in the presentation directory
//! - NFO files whose stem no other file in the same directory shares
//!
//! Every non-NFO entry counts as a recording for the second pass, so a
//! stray sidecar (e.g. `X.srt`) keeps `X.nfo` alive.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{has_extension, FileStem};

use super::fs::Filesystem;
use super::nfo::NFO_EXTENSION;

/// Result of one or more sweep passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Paths removed (or, in a dry run, that would be removed)
    pub removed: Vec<PathBuf>,

    /// Entries or directories that could not be processed
    pub failures: usize,
}

impl SweepReport {
    pub fn merge(&mut self, other: SweepReport) {
        self.removed.extend(other.removed);
        self.failures += other.failures;
    }
}

/// Removes stale artifacts through a `Filesystem`
#[derive(Debug)]
pub struct Sweeper<'a, F: ?Sized> {
    fs: &'a F,
    dry_run: bool,
}

impl<'a, F: Filesystem + ?Sized> Sweeper<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs, dry_run: false }
    }

    /// Log instead of deleting
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Delete every symlink in `dir` whose target does not resolve.
    ///
    /// Only the link is removed, never what it points to.
    pub fn sweep_broken_symlinks(&self, dir: &Path) -> SweepReport {
        let mut report = SweepReport::default();

        let Some(entries) = self.list(dir, &mut report) else {
            return report;
        };

        for entry in entries {
            if self.fs.is_symlink(&entry) && !self.fs.exists(&entry) {
                if self.delete(&entry, &mut report) {
                    info!("Deleted broken symlink '{}'", entry.display());
                }
            }
        }

        report
    }

    /// Delete every NFO file in `dir` without a sibling of the same stem
    pub fn sweep_orphaned_metadata(&self, dir: &Path) -> SweepReport {
        self.sweep_orphaned_metadata_after(dir, &[])
    }

    /// Like `sweep_orphaned_metadata`, but entries in `removed` no longer
    /// count as siblings. Pass the result of an earlier pass so a dry run
    /// plans the same deletions a real run performs.
    pub fn sweep_orphaned_metadata_after(&self, dir: &Path, removed: &[PathBuf]) -> SweepReport {
        let mut report = SweepReport::default();

        let Some(entries) = self.list(dir, &mut report) else {
            return report;
        };

        let (nfo_files, others): (Vec<PathBuf>, Vec<PathBuf>) = entries
            .into_iter()
            .partition(|path| has_extension(path, NFO_EXTENSION));

        let recording_stems: HashSet<FileStem> = others
            .iter()
            .filter(|path| !removed.contains(path))
            .map(|path| FileStem::of(path))
            .collect();

        for nfo in nfo_files {
            if !self.fs.is_file(&nfo) {
                continue;
            }
            if recording_stems.contains(&FileStem::of(&nfo)) {
                continue;
            }
            if self.delete(&nfo, &mut report) {
                info!("Deleted orphaned NFO file '{}'", nfo.display());
            }
        }

        report
    }

    fn list(&self, dir: &Path, report: &mut SweepReport) -> Option<Vec<PathBuf>> {
        match self.fs.list_dir(dir) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot list directory, skipping sweep");
                report.failures += 1;
                None
            }
        }
    }

    fn delete(&self, path: &Path, report: &mut SweepReport) -> bool {
        if self.dry_run {
            info!(path = %path.display(), "Would delete");
            report.removed.push(path.to_path_buf());
            return false;
        }

        match self.fs.remove(path) {
            Ok(()) => {
                report.removed.push(path.to_path_buf());
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to delete");
                report.failures += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::memory::MemoryFs;

    #[test]
    fn test_broken_symlink_removed_live_one_kept() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/a.ts", "");
        fs.add_symlink("/pretty/A.ts", "/rec/a.ts");
        fs.add_symlink("/pretty/B.ts", "/rec/b.ts");
        fs.add_symlink("/pretty/C.jpg", "/rec/gone.jpg");

        let report = Sweeper::new(&fs).sweep_broken_symlinks(Path::new("/pretty"));

        assert_eq!(
            report.removed,
            vec![PathBuf::from("/pretty/B.ts"), PathBuf::from("/pretty/C.jpg")]
        );
        assert!(fs.node(Path::new("/pretty/A.ts")).is_some());
        assert!(fs.node(Path::new("/rec/a.ts")).is_some());
    }

    #[test]
    fn test_regular_files_ignored_by_symlink_sweep() {
        let fs = MemoryFs::new();
        fs.add_file("/pretty/notes.txt", "");

        let report = Sweeper::new(&fs).sweep_broken_symlinks(Path::new("/pretty"));
        assert!(report.removed.is_empty());
        assert_eq!(report.failures, 0);
    }

    #[test]
    fn test_orphaned_nfo_removed() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/a.ts", "");
        fs.add_file("/rec/a.nfo", "");
        fs.add_file("/rec/b.nfo", "");

        let report = Sweeper::new(&fs).sweep_orphaned_metadata(Path::new("/rec"));

        assert_eq!(report.removed, vec![PathBuf::from("/rec/b.nfo")]);
        assert!(fs.node(Path::new("/rec/a.nfo")).is_some());
    }

    #[test]
    fn test_any_sibling_extension_keeps_nfo() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/x.nfo", "");
        fs.add_file("/rec/x.srt", "");
        fs.add_file("/rec/y.z.nfo", "");
        fs.add_file("/rec/y.z.mpg", "");

        let report = Sweeper::new(&fs).sweep_orphaned_metadata(Path::new("/rec"));
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_stem_match_uses_full_stem() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/show.part1.ts", "");
        fs.add_file("/rec/show.nfo", "");

        let report = Sweeper::new(&fs).sweep_orphaned_metadata(Path::new("/rec"));
        assert_eq!(report.removed, vec![PathBuf::from("/rec/show.nfo")]);
    }

    #[test]
    fn test_delete_failure_does_not_stop_sweep() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/a.nfo", "");
        fs.add_file("/rec/b.nfo", "");
        fs.deny("/rec/a.nfo");

        let report = Sweeper::new(&fs).sweep_orphaned_metadata(Path::new("/rec"));

        assert_eq!(report.failures, 1);
        assert_eq!(report.removed, vec![PathBuf::from("/rec/b.nfo")]);
    }

    #[test]
    fn test_missing_directory_counts_as_failure() {
        let fs = MemoryFs::new();

        let report = Sweeper::new(&fs).sweep_orphaned_metadata(Path::new("/nowhere"));
        assert_eq!(report.failures, 1);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_dry_run_reports_but_keeps_files() {
        let fs = MemoryFs::new();
        fs.add_file("/rec/b.nfo", "");

        let report = Sweeper::new(&fs)
            .dry_run(true)
            .sweep_orphaned_metadata(Path::new("/rec"));

        assert_eq!(report.removed, vec![PathBuf::from("/rec/b.nfo")]);
        assert!(fs.node(Path::new("/rec/b.nfo")).is_some());
    }

    #[test]
    fn test_dry_run_plans_nfo_of_planned_link_removal() {
        let fs = MemoryFs::new();
        fs.add_symlink("/pretty/Show.ts", "/rec/gone.ts");
        fs.add_file("/pretty/Show.nfo", "");
        let sweeper = Sweeper::new(&fs).dry_run(true);

        let links = sweeper.sweep_broken_symlinks(Path::new("/pretty"));
        let metadata = sweeper.sweep_orphaned_metadata_after(Path::new("/pretty"), &links.removed);

        assert_eq!(links.removed, vec![PathBuf::from("/pretty/Show.ts")]);
        assert_eq!(metadata.removed, vec![PathBuf::from("/pretty/Show.nfo")]);
        assert_eq!(fs.paths().len(), 2);
    }
}
