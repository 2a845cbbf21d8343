//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler opens a [`Session`](crate::cli::Session), runs one library
//! operation and formats the result. An expression that does not resolve is
//! reported as "not found" whatever the reason.

mod log_cmd;
mod parse;
mod tags;
mod visible;

pub use log_cmd::log;
pub use parse::parse;
pub use tags::tags;
pub use visible::visible;

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Parse { expr } => parse(ctx, &expr),
        Command::Log {
            expr,
            limit,
            start,
            first_parent,
            json,
        } => log(ctx, &expr, limit, start.as_deref(), first_parent, json),
        Command::Tags { limit } => tags(ctx, limit),
        Command::Visible { hash } => visible(ctx, &hash),
    }
}
