//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `api.endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `api.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Presentation
    pub date_format: String,
    pub words_per_minute: usize,
    pub logo: String,
    #[serde(default)]
    pub labels: LabelsConfig,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            date_format: "D MMM YYYY".to_string(),
            words_per_minute: 200,
            logo: "/images/logo.svg".to_string(),
            labels: LabelsConfig::default(),

            api: ApiConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    /// Apply endpoint and token overrides; empty values are ignored
    pub fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using API endpoint from {}", ENV_API_ENDPOINT);
            self.api.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using access token from {}", ENV_ACCESS_TOKEN);
            self.api.access_token = Some(token);
        }
    }

    /// Reject settings the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.words_per_minute == 0 {
            anyhow::bail!("words_per_minute must be greater than zero");
        }
        if self.api.page_size == 0 || self.api.paths_page_size == 0 {
            anyhow::bail!("api.page_size and api.paths_page_size must be greater than zero");
        }
        if self.api.endpoint.trim().is_empty() {
            anyhow::bail!(
                "api.endpoint is not set (configure it in _config.yml or {})",
                ENV_API_ENDPOINT
            );
        }
        Ok(())
    }

    /// Locale name in the form chrono expects (`pt-BR` -> `pt_BR`)
    pub fn locale_name(&self) -> String {
        self.language.replace('-', "_")
    }
}

/// Interface strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub load_more: String,
    pub loading: String,
    pub reading_time_suffix: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            reading_time_suffix: "min".to_string(),
        }
    }
}

/// Headless content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository API root, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the posts
    pub post_type: String,
    /// Posts per page on the listing
    pub page_size: u32,
    /// Posts per request while discovering static paths
    pub paths_page_size: u32,
    pub orderings: Option<String>,
    pub lang: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            post_type: "posts".to_string(),
            page_size: 1,
            paths_page_size: 20,
            orderings: None,
            lang: None,
        }
    }
}
