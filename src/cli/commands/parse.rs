//! parse command - Resolve a revision expression

use crate::cli::Context;
use crate::revision::RevisionParser;
use anyhow::{bail, Context as _, Result};

/// Resolve `expr` and print the result as JSON.
pub fn parse(ctx: &Context, expr: &str) -> Result<()> {
    let session = ctx.open()?;
    let parser = RevisionParser::new(&session.git, &session.visibility);

    let Some(result) = parser
        .parse(expr)
        .with_context(|| format!("failed to resolve '{}'", expr))?
    else {
        bail!("not found");
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
