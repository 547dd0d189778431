//! Blog server implementation.

use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Request, State},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use inkpress_markdown::format_minutes;
use inkpress_render::{AssetPipeline, RenderContext, TemplateEngine};

use crate::config::ServerConfig;
use crate::error::{AppError, ErrorPage, ServerError};
use crate::store::{Post, PostStore};
use crate::watcher::{FileWatcher, WatchEvent};

/// Shared server state.
pub struct ServerState {
    config: ServerConfig,
    store: PostStore,
    templates: TemplateEngine,
    stylesheet: String,
}

pub type SharedState = Arc<RwLock<ServerState>>;

impl ServerState {
    /// Load posts and prepare templates and the stylesheet.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let store = PostStore::load(config.posts_dir.clone())?;
        let templates = TemplateEngine::with_overrides(config.templates_dir.clone());
        let stylesheet = AssetPipeline::new(config.minify).stylesheet();

        tracing::info!(
            "Loaded {} posts ({} drafts) from {}",
            store.len(),
            store.draft_count(),
            store.dir().display()
        );

        Ok(Self {
            config,
            store,
            templates,
            stylesheet,
        })
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    fn context(&self, title: &str, path: &str) -> RenderContext {
        RenderContext::new(self.config.site.clone(), title, path)
    }

    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, AppError> {
        Ok(self.templates.render(template, ctx)?)
    }

    fn error_page(&self, path: &str, error: &AppError) -> ErrorPage {
        let status = error.status();
        if status.is_server_error() {
            tracing::error!("{} {}", path, error);
        } else {
            tracing::debug!("{} {}", path, error);
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let html = self
            .context(title, path)
            .with("code", status.as_u16())
            .and_then(|ctx| ctx.with("message", error.public_message()))
            .and_then(|ctx| self.templates.render("error.html", &ctx))
            .unwrap_or_else(|e| {
                tracing::error!("Failed to render error page: {}", e);
                format!("<h1>{}</h1><p>{}</p>", status.as_u16(), title)
            });

        ErrorPage { status, html }
    }

    fn respond(&self, path: &str, result: Result<String, AppError>) -> Response {
        match result {
            Ok(html) => Html(html).into_response(),
            Err(e) => self.error_page(path, &e).into_response(),
        }
    }
}

/// Blog server.
pub struct BlogServer {
    config: ServerConfig,
}

impl BlogServer {
    /// Create a new blog server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Start serving until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw_addr = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(raw_addr.clone()))?;

        let state: SharedState = Arc::new(RwLock::new(ServerState::new(self.config.clone())?));

        if self.config.watch {
            let mut watch_paths = vec![self.config.posts_dir.clone()];
            watch_paths.extend(self.config.templates_dir.clone());

            let (watcher, mut rx) = FileWatcher::new(&watch_paths)
                .map_err(|e| ServerError::WatchError(e.to_string()))?;

            let state_clone = Arc::clone(&state);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    let mut events = vec![event];
                    while let Ok(more) = rx.try_recv() {
                        events.push(more);
                    }
                    handle_watch_events(&state_clone, &events).await;
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = router(state, &self.config.assets_dir);

        tracing::info!("Serving blog at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the application router. Static files are served from `assets_dir`.
pub fn router(state: SharedState, assets_dir: &FsPath) -> Router {
    let assets = Router::new()
        .route("/inkpress.css", get(stylesheet_handler))
        .fallback_service(ServeDir::new(assets_dir))
        .layer(middleware::from_fn(cache_control))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(index_handler))
        .route("/post/{slug}", get(post_handler))
        .route("/category/{name}", get(category_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/search-index.json", get(search_index_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .nest("/Assets", assets)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Reload whatever the changed files feed.
async fn handle_watch_events(state: &SharedState, events: &[WatchEvent]) {
    let posts_changed = events
        .iter()
        .any(|e| matches!(e, WatchEvent::PostChanged(_)));
    let templates_changed = events
        .iter()
        .any(|e| matches!(e, WatchEvent::TemplateChanged(_)));

    for event in events {
        match event {
            WatchEvent::PostChanged(path) => tracing::info!("Post changed: {}", path.display()),
            WatchEvent::TemplateChanged(path) => {
                tracing::info!("Template changed: {}", path.display())
            }
        }
    }

    if posts_changed {
        let dir = state.read().await.store.dir().to_path_buf();
        match tokio::task::spawn_blocking(move || PostStore::load(dir)).await {
            Ok(Ok(store)) => {
                tracing::info!("Reloaded {} posts", store.len());
                state.write().await.store = store;
            }
            Ok(Err(e)) => tracing::warn!("Keeping previous posts: {}", e),
            Err(e) => tracing::error!("Post reload task failed: {}", e),
        }
    }

    if templates_changed {
        state.write().await.templates.reload();
    }
}

async fn index_handler(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    state.respond("/", render_index(&state))
}

fn render_index(state: &ServerState) -> Result<String, AppError> {
    let posts: Vec<&Post> = state.store.published().collect();
    let ctx = state
        .context("", "/")
        .with("posts", posts)?
        .with("categories", state.store.categories())?;
    state.render("index.html", &ctx)
}

async fn post_handler(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let state = state.read().await;
    state.respond(uri.path(), render_post(&state, &slug, uri.path()))
}

fn render_post(state: &ServerState, slug: &str, path: &str) -> Result<String, AppError> {
    let post = state
        .store
        .get(slug)
        .ok_or_else(|| AppError::NotFound(format!("No post named \"{}\".", slug)))?;

    let mut ctx = state.context(&post.title, path).with("post", post)?;
    if post.draft {
        ctx = ctx.with_section("head", r#"<meta name="robots" content="noindex">"#);
    }
    state.render("post.html", &ctx)
}

async fn category_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let state = state.read().await;
    state.respond(uri.path(), render_category(&state, &name, uri.path()))
}

fn render_category(state: &ServerState, name: &str, path: &str) -> Result<String, AppError> {
    let posts: Vec<&Post> = state.store.in_category(name).collect();
    if posts.is_empty() {
        return Err(AppError::NotFound(format!("No posts in \"{}\".", name)));
    }

    let ctx = state
        .context(name, path)
        .with("category", name)?
        .with("posts", posts)?;
    state.render("category.html", &ctx)
}

async fn dashboard_handler(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    state.respond("/dashboard", render_dashboard(&state))
}

fn render_dashboard(state: &ServerState) -> Result<String, AppError> {
    let ctx = state
        .context("Dashboard", "/dashboard")
        .with("posts", state.store.all())?
        .with("drafts", state.store.draft_count())?
        .with("total_words", state.store.total_words())?
        .with_section("head", r#"<meta name="robots" content="noindex">"#);
    state.render("dashboard.html", &ctx)
}

/// One entry of `/search-index.json`.
#[derive(Debug, Serialize)]
struct SearchEntry<'a> {
    title: &'a str,
    url: String,
    summary: &'a str,
    reading_time: String,
    categories: &'a [String],
}

async fn search_index_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;

    let entries: Vec<SearchEntry<'_>> = state
        .store
        .published()
        .map(|post| SearchEntry {
            title: &post.title,
            url: post.url(),
            summary: post.description.as_deref().unwrap_or(&post.summary),
            reading_time: format_minutes(post.reading_minutes),
            categories: &post.categories,
        })
        .collect();

    Json(entries).into_response()
}

async fn sitemap_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    let base = state.config.site.base_url.trim_end_matches('/');

    let mut urls = vec![format!("  <url>\n    <loc>{}/</loc>\n  </url>", xml_escape(base))];
    urls.extend(state.store.published().map(|post| {
        let lastmod = post
            .date
            .map(|d| format!("\n    <lastmod>{}</lastmod>", d))
            .unwrap_or_default();
        format!(
            "  <url>\n    <loc>{}{}</loc>{}\n  </url>",
            xml_escape(base),
            xml_escape(&post.url()),
            lastmod
        )
    }));

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
        urls.join("\n")
    );

    ([(header::CONTENT_TYPE, "application/xml")], sitemap)
}

async fn stylesheet_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let css = state.read().await.stylesheet.clone();
    ([(header::CONTENT_TYPE, "text/css")], css)
}

async fn not_found_handler(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let state = state.read().await;
    let error = AppError::NotFound("Page not found.".to_string());
    state.error_page(uri.path(), &error).into_response()
}

/// Long-lived caching for scripts, styles and images; a day for the rest.
async fn cache_control(request: Request, next: Next) -> Response {
    let max_age = cache_max_age(request.uri().path());
    let mut response = next.run(request).await;

    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(max_age));
    }
    response
}

fn cache_max_age(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "js" | "css" | "png" | "jpg" | "svg" => "public, max-age=604800",
        _ => "public, max-age=86400",
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderMap, Request, StatusCode};
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    struct Fixture {
        temp: TempDir,
        state: SharedState,
    }

    impl Fixture {
        async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, String) {
            let app = router(Arc::clone(&self.state), &self.temp.path().join("Assets"));
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            let status = response.status();
            let headers = response.headers().clone();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, headers, String::from_utf8(body.to_vec()).unwrap())
        }
    }

    fn fixture() -> Fixture {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");
        let assets = temp.path().join("Assets");
        fs::create_dir_all(&posts).unwrap();
        fs::create_dir_all(&assets).unwrap();

        fs::write(
            posts.join("hello-world.md"),
            "---\ntitle: Hello World\ndate: 2024-03-09\ncategories: [rust]\n---\n## Intro\n\nFirst **post**.",
        )
        .unwrap();
        fs::write(
            posts.join("draft.md"),
            "---\ntitle: Work in progress\ndraft: true\n---\nSoon.",
        )
        .unwrap();
        fs::write(assets.join("app.js"), "console.log(1);").unwrap();
        fs::write(assets.join("notes.txt"), "hi").unwrap();

        let config = ServerConfig {
            posts_dir: posts,
            assets_dir: assets,
            minify: false,
            watch: false,
            ..Default::default()
        };
        let state = Arc::new(RwLock::new(ServerState::new(config).unwrap()));
        Fixture { temp, state }
    }

    #[tokio::test]
    async fn index_lists_published_posts() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello World"));
        assert!(body.contains("1 min read"));
        assert!(!body.contains("Work in progress"));
    }

    #[tokio::test]
    async fn post_page_wraps_content() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/post/hello-world").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<div class="markdown-content">"#));
        assert!(body.contains(r#"<h2 id="intro">Intro</h2>"#));
        assert!(body.contains("<strong>post</strong>"));
    }

    #[tokio::test]
    async fn drafts_are_previewable_but_not_indexed() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/post/draft").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"content="noindex""#));

        let (_, _, sitemap) = fixture.get("/sitemap.xml").await;
        assert!(sitemap.contains("/post/hello-world</loc>"));
        assert!(sitemap.contains("<lastmod>2024-03-09</lastmod>"));
        assert!(!sitemap.contains("/post/draft"));
    }

    #[tokio::test]
    async fn unknown_pages_render_404() {
        let fixture = fixture();

        let (status, _, body) = fixture.get("/post/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<h1>404</h1>"));

        let (status, _, _) = fixture.get("/category/cooking").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = fixture.get("/no/such/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found."));
    }

    #[tokio::test]
    async fn category_page_filters_posts() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/category/rust").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello World"));
    }

    #[tokio::test]
    async fn dashboard_lists_drafts() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Work in progress"));
        assert!(body.contains("2 posts, 1 drafts"));
    }

    #[tokio::test]
    async fn search_index_is_json() {
        let fixture = fixture();
        let (status, _, body) = fixture.get("/search-index.json").await;

        assert_eq!(status, StatusCode::OK);
        let entries: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 1);
        assert_eq!(entries[0]["url"], "/post/hello-world");
        assert_eq!(entries[0]["reading_time"], "Less than 1 min read");
    }

    #[tokio::test]
    async fn assets_carry_cache_headers() {
        let fixture = fixture();

        let (status, headers, _) = fixture.get("/Assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=604800");

        let (_, headers, _) = fixture.get("/Assets/notes.txt").await;
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=86400");

        let (status, headers, body) = fixture.get("/Assets/inkpress.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/css");
        assert!(body.contains(".copy-code-btn"));
    }

    #[tokio::test]
    async fn reloads_posts_on_change() {
        let fixture = fixture();
        let path = fixture.temp.path().join("posts").join("second.md");
        fs::write(&path, "---\ntitle: Second\n---\nMore.").unwrap();

        handle_watch_events(&fixture.state, &[WatchEvent::PostChanged(path)]).await;

        assert!(fixture.state.read().await.store().get("second").is_some());
    }

    #[test]
    fn cache_ages_follow_extension() {
        assert_eq!(cache_max_age("/logo.SVG"), "public, max-age=604800");
        assert_eq!(cache_max_age("/font.woff2"), "public, max-age=86400");
        assert_eq!(cache_max_age("/README"), "public, max-age=86400");
    }

    #[test]
    fn escapes_sitemap_text() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
