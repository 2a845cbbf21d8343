//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// revgate - resolve and page through revisions without exposing hidden objects
#[derive(Parser, Debug)]
#[command(name = "revgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if revgate was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a revision expression and print it as JSON
    #[command(after_help = "\
EXAMPLES:
    revgate parse main
    revgate parse v1.0^{tree}       # rejected: dereference markers are not supported
    revgate parse main~2..main/src
    revgate parse 1a2b3c^!")]
    Parse {
        /// Revision expression, optionally followed by /path
        expr: String,
    },

    /// Show one page of history
    Log {
        /// Revision expression to start from (A..B hides A)
        expr: String,

        /// Commits per page (defaults to [log] page_size)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Resume at this commit
        #[arg(long, value_name = "OID")]
        start: Option<String>,

        /// Follow only first parents
        #[arg(long)]
        first_parent: bool,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tags, newest first
    Tags {
        /// Maximum number of tags to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Check whether an object is reachable from a browsable ref
    Visible {
        /// Full or abbreviated object id
        hash: String,
    },
}
