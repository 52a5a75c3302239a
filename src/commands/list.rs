//! List posts from the content API

use anyhow::Result;
use std::io::Write;

use crate::client::{ContentApi, QueryOptions};
use crate::listing::Listing;
use crate::views::Presenter;
use crate::Blog;

/// Print the listing; with `all`, keep loading pages until the feed ends
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    let mut out = Vec::new();
    write_listing(blog, &client, all, &mut out).await?;
    std::io::stdout().write_all(&out)?;
    Ok(())
}

/// Fetch the listing and write one line per post
pub async fn write_listing<A: ContentApi, W: Write>(
    blog: &Blog,
    api: &A,
    all: bool,
    out: &mut W,
) -> Result<()> {
    let api_config = &blog.config.api;
    let options = QueryOptions::new()
        .page_size(api_config.page_size)
        .orderings(api_config.orderings.clone())
        .lang(api_config.lang.clone());

    let mut listing = Listing::fetch(api, &api_config.post_type, &options).await?;
    if all {
        listing.load_all(api).await?;
    }

    let presenter = Presenter::new(&blog.config);
    writeln!(out, "Posts ({}):", listing.posts().len())?;
    for post in listing.posts() {
        let date = presenter
            .format_date(post.first_publication_date.as_ref())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {} - {} [{}]",
            date,
            post.data.title,
            post.uid.as_deref().unwrap_or("no uid")
        )?;
    }
    if listing.can_load_more() {
        writeln!(out, "  ... more available (use --all)")?;
    }

    Ok(())
}
