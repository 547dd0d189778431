//! Stylesheet for blog pages and the content enhancements.

use crate::RenderError;

/// Builds the site stylesheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetPipeline {
    minify: bool,
}

impl AssetPipeline {
    pub fn new(minify: bool) -> Self {
        Self { minify }
    }

    /// The stylesheet served at `/Assets/inkpress.css`.
    ///
    /// Falls back to the unminified source if minification fails.
    pub fn stylesheet(&self) -> String {
        if !self.minify {
            return DEFAULT_CSS.to_string();
        }

        match Self::minify_css(DEFAULT_CSS) {
            Ok(css) => css,
            Err(e) => {
                tracing::warn!("Serving unminified stylesheet: {}", e);
                DEFAULT_CSS.to_string()
            }
        }
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, RenderError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| RenderError::Css(format!("parse error: {}", e)))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| RenderError::Css(format!("minify error: {}", e)))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* inkpress */

:root {
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #f6f8fa;
  --muted-foreground: #59636e;
  --border: #d1d9e0;
  --primary: #0969da;
  --primary-foreground: #ffffff;
  --radius: 0.5rem;
  --content-max-width: 760px;
  --scroll-progress: 0%;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

/* Layout */
.site-header,
.site-footer {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1rem 1.5rem;
  border-bottom: 1px solid var(--border);
}

.site-header {
  position: sticky;
  top: 0;
  z-index: 10;
  background: var(--background);
}

.site-footer {
  border-top: 1px solid var(--border);
  border-bottom: none;
}

.site-logo {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.site-nav a {
  margin-left: 1rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.site-main {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2rem 1.5rem;
}

/* Reading progress */
.reading-progress {
  position: fixed;
  top: 0;
  left: 0;
  height: 3px;
  width: var(--scroll-progress);
  background: var(--primary);
  z-index: 20;
  transition: width 0.1s linear;
}

/* Post listings */
.post-card {
  padding: 1.25rem 0;
  border-bottom: 1px solid var(--border);
}

.post-card h2 {
  margin: 0 0 0.25rem;
}

.post-card h2 a {
  color: var(--foreground);
  text-decoration: none;
}

.post-meta {
  color: var(--muted-foreground);
  font-size: 0.875rem;
}

.post-categories {
  display: flex;
  gap: 0.5rem;
  padding: 0;
  list-style: none;
}

.post-categories a,
.category-tag {
  padding: 0.125rem 0.5rem;
  border-radius: 999px;
  background: var(--muted);
  color: var(--muted-foreground);
  font-size: 0.75rem;
  text-decoration: none;
}

/* Article content */
.markdown-content pre {
  position: relative;
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
}

.markdown-content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
}

.markdown-content img {
  max-width: 100%;
  border-radius: var(--radius);
}

/* Copy button */
.copy-code-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.5rem;
  background: var(--background);
  color: var(--muted-foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
  opacity: 0.7;
  transition: opacity 0.15s, color 0.15s;
}

.copy-code-btn:hover {
  opacity: 1;
}

.copy-code-btn.copied {
  color: #1a7f37;
  opacity: 1;
}

/* Table of contents */
.table-of-contents {
  margin-bottom: 2rem;
  padding: 1rem 1.25rem;
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
}

.toc-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
}

.toc-header h3 {
  margin: 0;
  font-size: 1rem;
}

.toc-toggle {
  background: none;
  border: none;
  cursor: pointer;
  color: var(--muted-foreground);
}

.table-of-contents ul {
  display: flex;
  flex-direction: column;
  gap: 0.5rem;
  margin: 0.75rem 0 0;
  padding: 0;
  list-style: none;
}

.table-of-contents.collapsed ul {
  display: none;
}

.table-of-contents a {
  display: block;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc-h3 {
  padding-left: 1rem;
}

.toc-h4,
.toc-h5,
.toc-h6 {
  padding-left: 2rem;
}

/* Image zoom */
.image-zoom-overlay {
  position: fixed;
  inset: 0;
  z-index: 100;
  display: flex;
  align-items: center;
  justify-content: center;
  background: rgba(0, 0, 0, 0.85);
  cursor: zoom-out;
}

.zoomed-image {
  max-width: 92vw;
  max-height: 92vh;
  cursor: default;
}

.zoom-close-btn {
  position: absolute;
  top: 1rem;
  right: 1rem;
  width: 44px;
  height: 44px;
  border: none;
  border-radius: 50%;
  background: rgba(255, 255, 255, 0.15);
  color: #ffffff;
  cursor: pointer;
}

/* Dashboard */
.dashboard-table {
  width: 100%;
  border-collapse: collapse;
}

.dashboard-table th,
.dashboard-table td {
  padding: 0.5rem;
  border-bottom: 1px solid var(--border);
  text-align: left;
}

.dashboard-table tr.draft {
  color: var(--muted-foreground);
}

@media (max-width: 768px) {
  .site-main {
    padding: 1rem;
  }

  .copy-code-btn {
    opacity: 1;
  }
}
"#;
