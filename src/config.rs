//! Configuration for mythnfo.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags and environment variables (MYTHNFO_URL, ...)
//! 2. Config file (--config, else ~/.config/mythnfo/config.yaml)
//! 3. Defaults (local backend, skip LiveTV, NFO files in place)
//!
//! A relative `target` in the config file is resolved against the config
//! file's directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::core::{ReconcileOptions, DEFAULT_SKIP_GROUPS};

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub skip_groups: Option<SkipGroups>,
    /// Presentation directory for readable symlinks
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Skip list as a YAML sequence or a comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SkipGroups {
    List(Vec<String>),
    Csv(String),
}

impl SkipGroups {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SkipGroups::List(groups) => groups.clone(),
            SkipGroups::Csv(list) => split_list(list),
        }
    }
}

/// Values given on the command line (or via environment)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub url: Option<String>,
    pub skip: Option<String>,
    pub target: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// MythTV API base URL
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Recording groups to skip
    pub skip_groups: Vec<String>,
    /// Presentation directory (symlink mode when set)
    pub target_dir: Option<PathBuf>,
    /// Path to config file (if one was read)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            skip_groups: split_list(DEFAULT_SKIP_GROUPS),
            target_dir: None,
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Engine options for this configuration
    pub fn reconcile_options(&self, dry_run: bool) -> ReconcileOptions {
        let options = ReconcileOptions::new()
            .with_skip_groups(&self.skip_groups)
            .with_dry_run(dry_run);

        match &self.target_dir {
            Some(dir) => options.with_target_dir(dir),
            None => options,
        }
    }
}

/// Split a comma-separated list, dropping empty entries
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Default config file location (~/.config/mythnfo/config.yaml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mythnfo").join("config.yaml"))
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources
pub fn load_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let config_file = match &overrides.config_file {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let file = match &config_file {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    Ok(merge(file, config_file, overrides))
}

fn merge(
    file: ConfigFile,
    config_file: Option<PathBuf>,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let api_url = overrides
        .url
        .clone()
        .or(file.api.url)
        .unwrap_or(defaults.api_url);

    let timeout = overrides
        .timeout_seconds
        .or(file.api.timeout_seconds)
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);

    let skip_groups = match (&overrides.skip, &file.skip_groups) {
        (Some(list), _) => split_list(list),
        (None, Some(groups)) => groups.to_vec(),
        (None, None) => defaults.skip_groups,
    };

    let target_dir = overrides.target.clone().or_else(|| {
        file.target
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| resolve_path(&base_dir, t))
    });

    ResolvedConfig {
        api_url,
        timeout,
        skip_groups,
        target_dir,
        config_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = merge(ConfigFile::default(), None, &ConfigOverrides::default());

        assert_eq!(config.api_url, "http://127.0.0.1:6544");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.skip_groups, vec!["LiveTV".to_string()]);
        assert!(config.target_dir.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
api:
  url: http://backend:6544
  timeout_seconds: 30
skip_groups:
  - LiveTV
  - Deleted
target: pretty
"#,
        );

        let overrides = ConfigOverrides {
            config_file: Some(path),
            ..Default::default()
        };
        let config = load_config(&overrides).unwrap();

        assert_eq!(config.api_url, "http://backend:6544");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.skip_groups, vec!["LiveTV", "Deleted"]);
        assert_eq!(config.target_dir, Some(temp.path().join("pretty")));
    }

    #[test]
    fn test_skip_groups_as_string() {
        let file: ConfigFile = serde_yaml::from_str("skip_groups: \"LiveTV, Deleted\"").unwrap();
        assert_eq!(
            file.skip_groups.unwrap().to_vec(),
            vec!["LiveTV".to_string(), "Deleted".to_string()]
        );
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file: ConfigFile = serde_yaml::from_str(
            "api:\n  url: http://file:6544\nskip_groups: [LiveTV]\ntarget: /from/file\n",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            url: Some("http://cli:6544".to_string()),
            skip: Some(String::new()),
            target: Some(PathBuf::from("/from/cli")),
            ..Default::default()
        };

        let config = merge(file, None, &overrides);
        assert_eq!(config.api_url, "http://cli:6544");
        assert!(config.skip_groups.is_empty());
        assert_eq!(config.target_dir, Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn test_missing_explicit_config_file_errors() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            config_file: Some(temp.path().join("nope.yaml")),
            ..Default::default()
        };
        assert!(load_config(&overrides).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/.config/mythnfo");

        assert_eq!(
            resolve_path(&base, "pretty"),
            PathBuf::from("/home/user/.config/mythnfo/pretty")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_reconcile_options_from_config() {
        let config = ResolvedConfig {
            skip_groups: vec!["LiveTV".to_string()],
            target_dir: Some(PathBuf::from("/pretty")),
            ..Default::default()
        };

        let options = config.reconcile_options(true);
        assert!(options.skips("livetv"));
        assert!(options.is_dry_run());
        assert_eq!(options.target_dir(), Some(Path::new("/pretty")));
    }
}
