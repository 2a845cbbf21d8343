//! visible command - Check reachability from browsable refs

use crate::cli::Context;
use crate::visibility::VisibilityQuery;
use anyhow::Result;
use tracing::debug;

/// Print whether `hash` names a visible object.
///
/// A hash that matches nothing, or matches more than one object, is
/// reported as not visible.
pub fn visible(ctx: &Context, hash: &str) -> Result<()> {
    let session = ctx.open()?;

    let visible = match session.git.resolve_hash(hash)? {
        Some(oid) => session
            .visibility
            .is_visible(&session.git, &VisibilityQuery::new(oid))?,
        None => false,
    };

    debug!(stats = ?session.visibility.stats(), "visibility cache");
    println!("{}", if visible { "visible" } else { "not visible" });
    Ok(())
}
