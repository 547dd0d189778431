//! Configuration file (`inkpress.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use inkpress_server::ServerConfig;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub posts: PostsSettings,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub open: bool,
    #[serde(default = "default_true")]
    pub watch: bool,
    #[serde(default = "default_true")]
    pub minify: bool,
}

#[derive(Debug, Deserialize)]
pub struct PostsSettings {
    #[serde(default = "default_posts_dir")]
    pub dir: String,
    #[serde(default = "default_assets_dir")]
    pub assets: String,
    /// Directory of template overrides
    pub templates: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: false,
            watch: true,
            minify: true,
        }
    }
}

impl Default for PostsSettings {
    fn default() -> Self {
        Self {
            dir: default_posts_dir(),
            assets: default_assets_dir(),
            templates: None,
        }
    }
}

fn default_title() -> String {
    "inkpress".to_string()
}
fn default_base_url() -> String {
    "http://localhost:3065".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3065
}
fn default_true() -> bool {
    true
}
fn default_posts_dir() -> String {
    "posts".to_string()
}
fn default_assets_dir() -> String {
    "Assets".to_string()
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

impl ConfigFile {
    /// Server configuration with paths resolved against `root`.
    pub fn server_config(&self, root: &Path) -> ServerConfig {
        let resolve = |dir: &str| -> PathBuf { root.join(dir) };

        ServerConfig {
            posts_dir: resolve(&self.posts.dir),
            assets_dir: resolve(&self.posts.assets),
            templates_dir: self.posts.templates.as_deref().map(resolve),
            port: self.server.port,
            host: self.server.host.clone(),
            open: self.server.open,
            watch: self.server.watch,
            minify: self.server.minify,
            site: inkpress_render::SiteInfo {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                base_url: self.site.base_url.clone(),
            },
        }
    }
}
