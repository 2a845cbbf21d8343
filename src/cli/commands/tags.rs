//! tags command - List tags newest first

use crate::cli::Context;
use crate::history::{tags::list_tags, NO_TIME};
use anyhow::Result;

/// Print tags sorted by time.
pub fn tags(ctx: &Context, limit: Option<usize>) -> Result<()> {
    let session = ctx.open()?;
    let tags = list_tags(&session.git, &session.times, limit)?;

    if tags.is_empty() {
        println!("No tags.");
        return Ok(());
    }

    for tag in &tags {
        println!("{:<10} {} {}", format_time(tag.time), tag.target.short(7), tag.name);
    }
    Ok(())
}

fn format_time(time: i64) -> String {
    if time == NO_TIME {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp(time, 0)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
