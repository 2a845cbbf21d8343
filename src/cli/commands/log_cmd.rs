//! log command - Display one page of history
//!
//! The page is followed by `previous:` / `next:` markers that can be passed
//! back through `--start`.

use crate::cli::Context;
use crate::core::types::Oid;
use crate::history::{seed_walk, Page, Paginator};
use crate::revision::RevisionParser;
use anyhow::{bail, Context as _, Result};

/// Show one page of history for `expr`.
pub fn log(
    ctx: &Context,
    expr: &str,
    limit: Option<usize>,
    start: Option<&str>,
    first_parent: bool,
    json: bool,
) -> Result<()> {
    let session = ctx.open()?;
    let parser = RevisionParser::new(&session.git, &session.visibility);

    let Some(result) = parser.parse(expr)? else {
        bail!("not found");
    };
    let start = start
        .map(Oid::new)
        .transpose()
        .context("--start must be a full object id")?;

    let mut walk = seed_walk(&session.git, &result)
        .with_context(|| format!("'{}' does not name a commit", expr))?;
    if first_parent {
        walk.first_parent_only()?;
    }

    let page_size = limit.unwrap_or_else(|| session.config.page_size());
    let page = Paginator::new(walk, page_size, start).paginate()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&page);
    }
    Ok(())
}

fn print_page(page: &Page) {
    for commit in &page.items {
        println!(
            "{} {} {} {}",
            commit.oid.short(7),
            commit.author_time.format("%Y-%m-%d"),
            commit.author_name,
            commit.summary
        );
    }

    if let Some(previous) = &page.previous_start {
        println!("previous: {}", previous);
    }
    if let Some(next) = &page.next_start {
        println!("next: {}", next);
    }
}
