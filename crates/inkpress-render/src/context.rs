//! Per-render template context.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::RenderError;

/// Site-wide values every page can use.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    /// Absolute base URL, used for canonical links and the sitemap
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "inkpress".to_string(),
            description: String::new(),
            base_url: "http://localhost:3065".to_string(),
        }
    }
}

/// Named HTML fragments a page hands to its layout, such as extra `head`
/// tags or page `scripts`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Sections(BTreeMap<String, String>);

impl Sections {
    /// Set a section, replacing any earlier content.
    pub fn set(&mut self, name: impl Into<String>, html: impl Into<String>) {
        self.0.insert(name.into(), html.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a template sees for one render.
///
/// Built fresh for each response; nothing leaks between renders.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub site: SiteInfo,
    /// Page title
    pub title: String,
    /// Request path, for canonical links
    pub path: String,
    pub sections: Sections,
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl RenderContext {
    pub fn new(site: SiteInfo, title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            site,
            title: title.into(),
            path: path.into(),
            sections: Sections::default(),
            values: Map::new(),
        }
    }

    /// Add a page value, available to templates under `key`.
    pub fn insert(&mut self, key: &str, value: impl Serialize) -> Result<(), RenderError> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, RenderError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn with_section(mut self, name: &str, html: impl Into<String>) -> Self {
        self.sections.set(name, html);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_flatten_next_to_fixed_fields() {
        let ctx = RenderContext::new(SiteInfo::default(), "Home", "/")
            .with("posts", vec!["a", "b"])
            .unwrap()
            .with_section("head", "<meta name=\"x\">");

        let json = serde_json::to_value(&ctx).unwrap();

        assert_eq!(json["title"], "Home");
        assert_eq!(json["posts"][1], "b");
        assert_eq!(json["sections"]["head"], "<meta name=\"x\">");
    }

    #[test]
    fn sections_are_per_context() {
        let first = RenderContext::new(SiteInfo::default(), "A", "/a").with_section("scripts", "x");
        let second = RenderContext::new(SiteInfo::default(), "B", "/b");

        assert_eq!(first.sections.get("scripts"), Some("x"));
        assert!(second.sections.is_empty());
    }
}
