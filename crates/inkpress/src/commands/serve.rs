//! Blog server command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use inkpress_server::{BlogServer, ServerConfig};

use crate::config::load_config;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub dir: Option<PathBuf>,
    pub open: bool,
    pub watch: bool,
}

/// Run the serve command.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<()> {
    let config = resolve(config_path, overrides)?;

    tracing::info!(
        "Serving posts from {} on port {}",
        config.posts_dir.display(),
        config.port
    );

    BlogServer::new(config).start().await?;

    Ok(())
}

/// Merge the config file with command-line overrides.
///
/// Relative paths in the config file resolve against its directory.
fn resolve(config_path: &Path, overrides: Overrides) -> Result<ServerConfig> {
    let file = load_config(config_path)?;
    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut config = file.server_config(root);

    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(host) = overrides.host {
        config.host = host;
    }
    if let Some(dir) = overrides.dir {
        config.posts_dir = dir;
    }
    config.open |= overrides.open;
    config.watch &= overrides.watch;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn flags_override_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("inkpress.toml");
        fs::write(&path, "[server]\nport = 4000\nwatch = true\n").unwrap();

        let config = resolve(
            &path,
            Overrides {
                port: Some(5000),
                dir: Some(PathBuf::from("elsewhere")),
                watch: false,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.posts_dir, PathBuf::from("elsewhere"));
        assert!(!config.watch);
    }

    #[test]
    fn config_file_used_without_flags() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("inkpress.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let config = resolve(
            &path,
            Overrides {
                watch: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.posts_dir, temp.path().join("posts"));
        assert!(config.watch);
    }
}
