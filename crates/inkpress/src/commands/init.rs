//! Initialize a blog in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::load_config;

/// Run the init command, writing the config file at `config_path` and the
/// directories it names.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing inkpress...");

    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    } else {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    }

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = load_config(config_path)?.server_config(root);

    fs::create_dir_all(&config.posts_dir).context("Failed to create posts directory")?;
    fs::create_dir_all(&config.assets_dir).context("Failed to create assets directory")?;

    let welcome = config.posts_dir.join("welcome.md");
    if !welcome.exists() || yes {
        fs::write(&welcome, DEFAULT_POST).context("Failed to write welcome.md")?;
        tracing::info!("Created {}", welcome.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'inkpress serve' to start the blog.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# inkpress configuration

[site]
title = "My Blog"
description = ""
# Absolute URL used for canonical links and the sitemap
base_url = "http://localhost:3065"

[server]
host = "127.0.0.1"
# The PORT environment variable and --port take precedence
port = 3065
open = false
watch = true
minify = true

[posts]
dir = "posts"
assets = "Assets"
# Directory of templates that replace the built-in ones
# templates = "templates"
"#;

const DEFAULT_POST: &str = r#"---
title: Welcome to inkpress
description: Your first post.
date: 2024-01-01
categories: [meta]
---

# Welcome

This blog is served by **inkpress**. Every Markdown file in `posts/` becomes a
post, and the home page lists them newest first with a reading-time estimate.

## Writing posts

Start each file with frontmatter:

```yaml
---
title: Post title
date: 2024-01-31
categories: [notes]
draft: false
---
```

Drafts only show up on the [dashboard](/dashboard).

## Next steps

- Edit `inkpress.toml` to set the site title
- Add images under `Assets/`
"#;
