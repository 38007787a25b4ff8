//! Storage group to directory mapping.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Storage groups that never hold recordings
pub const NON_RECORDING_GROUPS: &[&str] = &[
    "Banners",
    "Coverart",
    "DB Backups",
    "Fanart",
    "Screenshots",
    "Trailers",
];

/// Ordered mapping from storage group name to candidate directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageMap {
    groups: Vec<(String, Vec<PathBuf>)>,
}

impl StorageMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(group, directory)` pairs in upstream order.
    ///
    /// Artwork and backup groups are dropped.
    pub fn from_pairs<I, G, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (G, D)>,
        G: Into<String>,
        D: Into<PathBuf>,
    {
        let mut map = Self::new();
        for (group, dir) in pairs {
            map.insert(group, dir);
        }
        map
    }

    /// Append a directory to a group, creating the group if needed
    pub fn insert(&mut self, group: impl Into<String>, dir: impl Into<PathBuf>) {
        let group = group.into();
        if NON_RECORDING_GROUPS.contains(&group.as_str()) {
            return;
        }

        let dir = dir.into();
        match self.groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, dirs)) => {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
            None => self.groups.push((group, vec![dir])),
        }
    }

    /// Candidate directories of a group, in listed order
    pub fn directories(&self, group: &str) -> Option<&[PathBuf]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, dirs)| dirs.as_slice())
    }

    /// Every directory of every group, first-seen order, without duplicates
    pub fn all_directories(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(|(_, dirs)| dirs.iter())
            .filter(|dir| seen.insert(dir.as_path()))
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
