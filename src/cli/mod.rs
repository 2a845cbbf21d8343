//! cli
//!
//! Command-line interface layer for revgate.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Open the repository, load config and build the shared caches
//! - Delegate to command handlers
//!
//! The CLI never writes to the repository.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::{warn, Level};

use crate::core::config::Config;
use crate::git::Git;
use crate::history::TimeCache;
use crate::visibility::VisibilityCache;

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
}

impl Context {
    /// Open the repository and everything a command reads through.
    pub fn open(&self) -> Result<Session> {
        let cwd = match &self.cwd {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        Session::open(&cwd)
    }
}

/// A repository plus the caches a server instance would share.
#[derive(Debug)]
pub struct Session {
    pub git: Git,
    pub config: Config,
    pub visibility: VisibilityCache,
    pub times: TimeCache,
}

impl Session {
    pub fn open(path: &Path) -> Result<Self> {
        let git = Git::open(path).context("failed to open repository")?;
        let loaded = Config::load(Some(git.git_dir())).context("failed to load config")?;
        for warning in &loaded.warnings {
            warn!(path = %warning.path.display(), "{}", warning.message);
        }

        let visibility = VisibilityCache::from_config(&loaded.config);
        Ok(Self {
            git,
            config: loaded.config,
            visibility,
            times: TimeCache::new(),
        })
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
    };

    commands::dispatch(cli.command, &ctx)
}
