//! Locate a recording's file among its storage group's directories.

use std::path::{Path, PathBuf};

use crate::domain::{CatalogRecord, StorageMap};

use super::fs::Filesystem;

/// A record together with the directory its file was found in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecording {
    pub record: CatalogRecord,
    pub directory: PathBuf,
}

impl ResolvedRecording {
    /// Absolute path of the recording file
    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.record.file_name)
    }
}

/// First candidate directory of the record's storage group that holds
/// the file as a regular file.
///
/// `None` when the group is unknown or no directory has the file; such
/// records are stale catalog entries and are skipped by the caller.
pub fn resolve<'a, F: Filesystem + ?Sized>(
    fs: &F,
    record: &CatalogRecord,
    storage: &'a StorageMap,
) -> Option<&'a Path> {
    storage
        .directories(&record.storage_group)?
        .iter()
        .find(|dir| fs.is_file(&dir.join(&record.file_name)))
        .map(PathBuf::as_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::memory::MemoryFs;
    use chrono::{TimeZone, Utc};

    fn record(group: &str, file: &str) -> CatalogRecord {
        CatalogRecord::new(
            "Show",
            group,
            file,
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap(),
        )
    }

    fn storage() -> StorageMap {
        StorageMap::from_pairs([
            ("Default", "/mnt/a"),
            ("Default", "/mnt/b"),
            ("Default", "/mnt/c"),
        ])
    }

    #[test]
    fn test_resolves_first_directory_with_file() {
        let fs = MemoryFs::new();
        fs.add_file("/mnt/b/rec.ts", "");
        fs.add_file("/mnt/c/rec.ts", "");
        let storage = storage();

        let dir = resolve(&fs, &record("Default", "rec.ts"), &storage);
        assert_eq!(dir, Some(Path::new("/mnt/b")));
    }

    #[test]
    fn test_unknown_group_is_unresolved() {
        let fs = MemoryFs::new();
        fs.add_file("/mnt/a/rec.ts", "");
        let storage = storage();

        assert_eq!(resolve(&fs, &record("Archive", "rec.ts"), &storage), None);
    }

    #[test]
    fn test_missing_file_is_unresolved() {
        let fs = MemoryFs::new();
        fs.add_file("/mnt/a/other.ts", "");
        let storage = storage();

        assert_eq!(resolve(&fs, &record("Default", "rec.ts"), &storage), None);
    }

    #[test]
    fn test_dangling_symlink_is_not_a_file() {
        let fs = MemoryFs::new();
        fs.add_symlink("/mnt/a/rec.ts", "/gone/rec.ts");
        let storage = storage();

        assert_eq!(resolve(&fs, &record("Default", "rec.ts"), &storage), None);
    }

    #[test]
    fn test_source_path() {
        let resolved = ResolvedRecording {
            record: record("Default", "rec.ts"),
            directory: PathBuf::from("/mnt/b"),
        };
        assert_eq!(resolved.source_path(), PathBuf::from("/mnt/b/rec.ts"));
    }
}
