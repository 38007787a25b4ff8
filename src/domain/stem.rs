//! Path stems used to pair metadata files with their recordings.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// A path with its final extension removed.
///
/// `/rec/a.b.ts` and `/rec/a.b.nfo` share the stem `/rec/a.b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileStem(PathBuf);

impl FileStem {
    /// Derive the stem of a path
    pub fn of(path: &Path) -> Self {
        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(_)) => Self(path.with_file_name(stem)),
            _ => Self(path.to_path_buf()),
        }
    }

    /// Re-attach an extension
    pub fn with_extension(&self, extension: impl AsRef<OsStr>) -> PathBuf {
        let mut name = self.0.as_os_str().to_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for FileStem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Whether a path carries the given extension (case-sensitive)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_strips_only_last_extension() {
        assert_eq!(
            FileStem::of(Path::new("/rec/Show - S01E02.part.ts")),
            FileStem::of(Path::new("/rec/Show - S01E02.part.nfo"))
        );
        assert_eq!(
            FileStem::of(Path::new("/rec/a.b.ts")).as_path(),
            Path::new("/rec/a.b")
        );
    }

    #[test]
    fn test_stem_without_extension() {
        assert_eq!(
            FileStem::of(Path::new("/rec/README")).as_path(),
            Path::new("/rec/README")
        );
        assert_eq!(
            FileStem::of(Path::new("/rec/.hidden")).as_path(),
            Path::new("/rec/.hidden")
        );
    }

    #[test]
    fn test_with_extension_keeps_inner_dots() {
        let stem = FileStem::of(Path::new("/rec/Dr. Who [20240101T2000].ts"));
        assert_eq!(
            stem.with_extension("nfo"),
            PathBuf::from("/rec/Dr. Who [20240101T2000].nfo")
        );
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.nfo"), "nfo"));
        assert!(!has_extension(Path::new("a.NFO"), "nfo"));
        assert!(!has_extension(Path::new("nfo"), "nfo"));
    }
}
