//! Built-in theme templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{LabelsConfig, SiteConfig};
use crate::helpers::url_for;
use crate::views::{DetailPage, ListingView};

/// Static files written next to the generated pages
pub const ASSETS: &[(&str, &str)] = &[
    ("images/logo.svg", include_str!("theme/assets/logo.svg")),
    ("css/style.css", include_str!("theme/assets/style.css")),
];

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// The listing (home) page
    pub fn render_listing(&self, site: &SiteData, listing: &ListingView) -> Result<String> {
        let mut context = site.context();
        context.insert("listing", listing);
        self.render("index.html", &context)
    }

    /// A detail page, or its loading placeholder while unresolved
    pub fn render_detail(&self, site: &SiteData, page: &DetailPage) -> Result<String> {
        match page {
            DetailPage::Fallback => self.render_loading(site, None),
            DetailPage::Resolved(post) => {
                let mut context = site.context();
                context.insert("post", post.as_ref());
                self.render("post.html", &context)
            }
        }
    }

    /// Loading placeholder; with `refresh_seconds` the browser polls for the real page
    pub fn render_loading(&self, site: &SiteData, refresh_seconds: Option<u32>) -> Result<String> {
        let mut context = site.context();
        context.insert("refresh_seconds", &refresh_seconds);
        self.render("loading.html", &context)
    }
}

/// Site-wide values every template receives
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub home: String,
    pub logo: String,
    pub stylesheet: String,
    #[serde(skip)]
    pub labels: LabelsConfig,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            home: url_for(config, ""),
            logo: url_for(config, &config.logo),
            stylesheet: url_for(config, "css/style.css"),
            labels: config.labels.clone(),
        }
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", self);
        context.insert("labels", &self.labels);
        context
    }
}
