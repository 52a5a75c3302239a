//! Generator module - renders the site from the content API into static HTML

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::{ContentApi, QueryOptions};
use crate::content::{PostData, PostDetail};
use crate::helpers::is_safe_uid;
use crate::listing::Listing;
use crate::templates::{SiteData, TemplateRenderer, ASSETS};
use crate::views::{DetailPage, Presenter};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts shown on the first listing page
    pub listed: usize,
    /// Detail pages written
    pub posts: usize,
}

/// Static site generator over a content API
pub struct Generator<'a, A> {
    blog: &'a Blog,
    api: &'a A,
    renderer: TemplateRenderer,
    site: SiteData,
}

impl<'a, A: ContentApi> Generator<'a, A> {
    /// Create a new generator
    pub fn new(blog: &'a Blog, api: &'a A) -> Result<Self> {
        Ok(Self {
            blog,
            api,
            renderer: TemplateRenderer::new()?,
            site: SiteData::from_config(&blog.config),
        })
    }

    /// Generate the entire site; any content API failure aborts the run
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)
            .with_context(|| format!("failed to create {:?}", self.blog.public_dir))?;

        self.write_assets()?;
        let listed = self.generate_index().await?;

        let paths = self.static_paths().await?;
        tracing::info!("Found {} post paths", paths.len());

        for uid in &paths {
            self.generate_post(uid).await?;
        }

        Ok(GenerateReport {
            listed,
            posts: paths.len(),
        })
    }

    /// Render the listing page from the first page of posts
    pub async fn generate_index(&self) -> Result<usize> {
        let api_config = &self.blog.config.api;
        let options = QueryOptions::new()
            .page_size(api_config.page_size)
            .orderings(api_config.orderings.clone())
            .lang(api_config.lang.clone());

        let listing = Listing::fetch(self.api, &api_config.post_type, &options)
            .await
            .context("failed to fetch the post listing")?;

        let view = Presenter::new(&self.blog.config).listing(&listing);
        let html = self.renderer.render_listing(&self.site, &view)?;

        let output_path = self.blog.public_dir.join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(view.posts.len())
    }

    /// Uids of every post, one static path each
    pub async fn static_paths(&self) -> Result<Vec<String>> {
        let api_config = &self.blog.config.api;
        let options = QueryOptions::new()
            .page_size(api_config.paths_page_size)
            .orderings(api_config.orderings.clone())
            .lang(api_config.lang.clone());

        let mut listing = Listing::fetch(self.api, &api_config.post_type, &options)
            .await
            .context("failed to fetch post paths")?;
        listing
            .load_all(self.api)
            .await
            .context("failed to page through post paths")?;

        let mut paths = Vec::with_capacity(listing.posts().len());
        for post in listing.posts() {
            match post.uid.as_deref() {
                Some(uid) if is_safe_uid(uid) => {
                    if !paths.iter().any(|p| p == uid) {
                        paths.push(uid.to_string());
                    }
                }
                Some(uid) => tracing::warn!("Skipping post {} with unusable uid {:?}", post.id, uid),
                None => tracing::warn!("Skipping post {} without uid", post.id),
            }
        }
        Ok(paths)
    }

    /// Fetch one post by uid and write its page
    pub async fn generate_post(&self, uid: &str) -> Result<PathBuf> {
        let post: PostDetail = self
            .api
            .get_by_uid::<PostData>(&self.blog.config.api.post_type, uid)
            .await
            .with_context(|| format!("failed to fetch post {:?}", uid))?;

        let html = self.render_post(&post)?;
        let output_path = post_output_path(&self.blog.public_dir, uid);
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(output_path)
    }

    /// Render a resolved detail page
    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let view = Presenter::new(&self.blog.config).post(post);
        self.renderer
            .render_detail(&self.site, &DetailPage::Resolved(Box::new(view)))
    }

    /// Copy the embedded theme assets
    pub fn write_assets(&self) -> Result<()> {
        for (path, contents) in ASSETS {
            write_file(&self.blog.public_dir.join(path), contents)?;
        }
        Ok(())
    }
}

/// Where the page of post `uid` lives below `public_dir`
pub fn post_output_path(public_dir: &Path, uid: &str) -> PathBuf {
    public_dir.join("post").join(uid).join("index.html")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    // readers never see a half-written page
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", tmp_path, e))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| anyhow::anyhow!("Failed to move {:?} into place: {}", path, e))
}
