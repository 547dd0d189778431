//! Server configuration.

use std::path::PathBuf;

use inkpress_render::SiteInfo;

/// Configuration for the blog server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory containing post Markdown files
    pub posts_dir: PathBuf,

    /// Directory served under `/Assets`
    pub assets_dir: PathBuf,

    /// Optional directory whose templates replace the built-in ones
    pub templates_dir: Option<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Reload posts when files change
    pub watch: bool,

    /// Minify the generated stylesheet
    pub minify: bool,

    pub site: SiteInfo,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            assets_dir: PathBuf::from("Assets"),
            templates_dir: None,
            port: 3065,
            host: "127.0.0.1".to_string(),
            open: false,
            watch: true,
            minify: true,
            site: SiteInfo::default(),
        }
    }
}
