//! Local server over the generated site with on-demand post pages
//!
//! Posts that were not generated ahead of time are resolved on first
//! request: the visitor gets the loading placeholder while the page is
//! fetched and written in the background, then the real page.

use anyhow::Result;
use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::client::{ClientError, ContentApi};
use crate::generator::{post_output_path, Generator};
use crate::helpers::is_safe_uid;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// Seconds between placeholder reloads
const LOADING_REFRESH_SECS: u32 = 1;

/// Progress of an on-demand post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Pending,
    Missing,
    Failed,
}

/// Outcome of looking up a post page
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    Ready(PathBuf),
    /// First request for this uid; the caller must start resolving it
    Started,
    Pending,
    NotFound,
    Failed,
}

/// Server state
struct ServerState<A> {
    blog: Blog,
    api: A,
    renderer: TemplateRenderer,
    site: SiteData,
    resolutions: Mutex<HashMap<String, Resolution>>,
}

impl<A: ContentApi> ServerState<A> {
    fn new(blog: Blog, api: A) -> Result<Self> {
        let site = SiteData::from_config(&blog.config);
        Ok(Self {
            blog,
            api,
            renderer: TemplateRenderer::new()?,
            site,
            resolutions: Mutex::new(HashMap::new()),
        })
    }

    fn lookup(&self, uid: &str) -> Lookup {
        if !is_safe_uid(uid) {
            return Lookup::NotFound;
        }

        let path = post_output_path(&self.blog.public_dir, uid);
        if path.is_file() {
            return Lookup::Ready(path);
        }

        let mut resolutions = match self.resolutions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match resolutions.get(uid).copied() {
            Some(Resolution::Pending) => Lookup::Pending,
            // reported once, the next request asks the API again
            Some(Resolution::Missing) => {
                resolutions.remove(uid);
                Lookup::NotFound
            }
            Some(Resolution::Failed) => {
                resolutions.remove(uid);
                Lookup::Failed
            }
            None => {
                resolutions.insert(uid.to_string(), Resolution::Pending);
                Lookup::Started
            }
        }
    }

    fn finish(&self, uid: &str, outcome: Option<Resolution>) {
        let mut resolutions = match self.resolutions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match outcome {
            Some(resolution) => {
                resolutions.insert(uid.to_string(), resolution);
            }
            None => {
                resolutions.remove(uid);
            }
        }
    }

    fn loading_page(&self) -> Response {
        match self
            .renderer
            .render_loading(&self.site, Some(LOADING_REFRESH_SECS))
        {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render loading page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

/// Fetch and write the page for `uid`, recording the outcome
async fn resolve<A: ContentApi>(state: Arc<ServerState<A>>, uid: String) {
    let result = match Generator::new(&state.blog, &state.api) {
        Ok(generator) => generator.generate_post(&uid).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(path) => {
            tracing::info!("Resolved post {} on demand: {:?}", uid, path);
            state.finish(&uid, None);
        }
        Err(e) if is_not_found(&e) => {
            tracing::info!("No post with uid {:?}", uid);
            state.finish(&uid, Some(Resolution::Missing));
        }
        Err(e) => {
            tracing::error!("Failed to resolve post {:?}: {:#}", uid, e);
            state.finish(&uid, Some(Resolution::Failed));
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<ClientError>(), Some(e) if e.is_not_found()))
}

/// Start the server
pub async fn start<A>(blog: &Blog, api: A, ip: &str, port: u16, open: bool) -> Result<()>
where
    A: ContentApi + Send + 'static,
{
    let public_dir = blog.public_dir.clone();
    let state = Arc::new(ServerState::new(blog.clone(), api)?);

    let app = Router::new()
        .route("/post/:uid", get(post_handler::<A>))
        .route("/post/:uid/", get(post_handler::<A>))
        .fallback_service(ServeDir::new(&public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a post page, resolving it on demand when it was not generated
async fn post_handler<A>(
    State(state): State<Arc<ServerState<A>>>,
    UrlPath(uid): UrlPath<String>,
) -> Response
where
    A: ContentApi + Send + 'static,
{
    match state.lookup(&uid) {
        Lookup::Ready(path) => match tokio::fs::read_to_string(&path).await {
            Ok(content) => Html(content).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        },
        Lookup::Started => {
            tracing::debug!("Resolving post {:?} on demand", uid);
            tokio::spawn(resolve(state.clone(), uid));
            state.loading_page()
        }
        Lookup::Pending => state.loading_page(),
        Lookup::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Lookup::Failed => (StatusCode::BAD_GATEWAY, "Failed to load post").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
