//! Command-line interface for mythnfo.
//!
//! Runs a reconciliation pass by default; `config` shows the resolved
//! configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::adapters::MythApiClient;
use crate::config::{load_config, ConfigOverrides, ResolvedConfig};
use crate::core::{LocalFs, Reconciler};

const LONG_ABOUT: &str = "\
Create Kodi compatible NFO files for finished MythTV recordings.

By default, NFO files are saved in the same directory as the recordings.
If a target directory is set, NFO files are saved in there and symlinks with
human readable file names for the recordings get created.
Orphaned NFO files and broken symlinks are deleted automatically.
Requires MythTV >= v34";

const AFTER_HELP: &str = "\
To automatically create/delete NFO files for new/deleted recordings, add this
program as System Event Command: in MythTV's web interface, 'Backend Setup',
tab 'System Events', enter 'mythnfo' (plus extra options if needed) at
'Recording finished' and 'Recording deleted'.";

/// mythnfo - NFO files and readable symlinks for MythTV recordings
#[derive(Parser, Debug)]
#[command(name = "mythnfo")]
#[command(author, version, about, long_about = LONG_ABOUT, after_help = AFTER_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    /// Only log what would be created or deleted
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Connection and output settings shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct Settings {
    /// URL to MythTV APIv2 [default: http://127.0.0.1:6544]
    #[arg(short, long, env = "MYTHNFO_URL", value_name = "API-URL", global = true)]
    pub url: Option<String>,

    /// Skip recordings in these recording groups, comma separated [default: LiveTV]
    #[arg(short, long, env = "MYTHNFO_SKIP", value_name = "RECORDING_GROUPS", global = true)]
    pub skip: Option<String>,

    /// Target directory for pretty named symlinks and NFO files
    #[arg(short, long, env = "MYTHNFO_TARGET", value_name = "DIRECTORY", global = true)]
    pub target: Option<PathBuf>,

    /// Timeout for each API request in seconds [default: 15]
    #[arg(long, env = "MYTHNFO_TIMEOUT", value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Config file [default: ~/.config/mythnfo/config.yaml]
    #[arg(short, long, env = "MYTHNFO_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

impl Settings {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            url: self.url.clone(),
            skip: self.skip.clone(),
            target: self.target.clone(),
            timeout_seconds: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Create missing NFO files and symlinks, delete orphans (default)
    Run,

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = load_config(&self.settings.overrides())?;

        match self.command.unwrap_or(Commands::Run) {
            Commands::Run => run(&config, self.dry_run).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// One reconciliation pass against the configured backend
async fn run(config: &ResolvedConfig, dry_run: bool) -> Result<()> {
    let client = MythApiClient::new(&config.api_url, config.timeout)
        .context("Failed to set up MythTV API client")?;
    let fs = LocalFs::new();
    let reconciler = Reconciler::new(&fs, config.reconcile_options(dry_run));

    let report = reconciler.run(&client).await?;

    if dry_run {
        eprintln!("\n[Dry run, nothing changed: {}]", report);
    } else {
        eprintln!("\n[{}]", report);
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Resolved configuration:");
    println!(
        "  Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  API URL:     {}", config.api_url);
    println!("  Timeout:     {}s", config.timeout.as_secs());
    println!(
        "  Skip groups: {}",
        if config.skip_groups.is_empty() {
            "(none)".to_string()
        } else {
            config.skip_groups.join(", ")
        }
    );
    println!(
        "  Target:      {}",
        config
            .target_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none, NFO files next to recordings)".to_string())
    );

    Ok(())
}
