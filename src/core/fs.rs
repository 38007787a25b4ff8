//! Filesystem access used by the reconciliation engine.
//!
//! The engine only talks to the `Filesystem` trait so emission and sweep
//! logic can be exercised against an in-memory tree.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use filetime::FileTime;
use glob::{MatchOptions, Pattern};

/// Side-effecting file primitives
pub trait Filesystem {
    /// Regular file at `path` (follows symlinks)
    fn is_file(&self, path: &Path) -> bool;

    /// Anything resolvable at `path` (follows symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Symlink at `path` itself, dangling or not
    fn is_symlink(&self, path: &Path) -> bool;

    /// Non-hidden entries of a directory, sorted
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Write a new file; fails with `AlreadyExists` if anything is at `path`
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Set access and modification time without following symlinks
    fn set_times(&self, path: &Path, time: DateTime<Utc>) -> io::Result<()>;

    /// Remove a file or symlink (never a link's target)
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        // Surface a missing directory as an error instead of an empty glob
        std::fs::metadata(dir)?;

        let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {}: {}", dir.display(), e)
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_file(target, link)
        }
    }

    fn set_times(&self, path: &Path, time: DateTime<Utc>) -> io::Result<()> {
        let stamp = to_file_time(time);
        filetime::set_symlink_file_times(path, stamp, stamp)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Convert a UTC instant to a `FileTime`
pub fn to_file_time(time: DateTime<Utc>) -> FileTime {
    FileTime::from_unix_time(time.timestamp(), time.timestamp_subsec_nanos())
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_list_dir_skips_hidden_and_sorts() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.ts"), "").unwrap();
        std::fs::write(temp.path().join("a.nfo"), "").unwrap();
        std::fs::write(temp.path().join(".hidden.nfo"), "").unwrap();

        let entries = LocalFs.list_dir(temp.path()).unwrap();
        assert_eq!(
            entries,
            vec![temp.path().join("a.nfo"), temp.path().join("b.ts")]
        );
    }

    #[test]
    fn test_list_dir_escapes_glob_characters() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Shows [HD]");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("rec.ts"), "").unwrap();

        assert_eq!(LocalFs.list_dir(&dir).unwrap(), vec![dir.join("rec.ts")]);
    }

    #[test]
    fn test_list_dir_missing_directory_errors() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFs.list_dir(&temp.path().join("gone")).is_err());
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.nfo");
        LocalFs.create_new(&path, "first").unwrap();

        let err = LocalFs.create_new(&path, "second").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[cfg(unix)]
    #[test]
    fn test_set_times_does_not_follow_symlink() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("rec.ts");
        let link = temp.path().join("pretty.ts");
        std::fs::write(&target, "video").unwrap();
        LocalFs.symlink(&target, &link).unwrap();

        let when = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        LocalFs.set_times(&link, when).unwrap();

        let link_meta = std::fs::symlink_metadata(&link).unwrap();
        let target_meta = std::fs::metadata(&target).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&link_meta).unix_seconds(),
            when.timestamp()
        );
        assert_ne!(
            FileTime::from_last_modification_time(&target_meta).unix_seconds(),
            when.timestamp()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_flags() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling.ts");
        LocalFs.symlink(&temp.path().join("missing.ts"), &link).unwrap();

        assert!(LocalFs.is_symlink(&link));
        assert!(!LocalFs.exists(&link));
        assert!(!LocalFs.is_file(&link));
    }
}
