//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static site from the configured content API
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let client = blog.client()?;
    tracing::info!("Fetching content from {}", client.endpoint());

    let report = Generator::new(blog, &client)?.generate().await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} post pages ({} on the listing) in {:.2}s",
        report.posts,
        report.listed,
        duration.as_secs_f64()
    );

    Ok(report)
}
