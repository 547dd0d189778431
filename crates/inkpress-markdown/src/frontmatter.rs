//! Frontmatter extraction and parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parsed frontmatter from a post file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Post title (required)
    pub title: String,

    /// Short description used for listings and meta tags
    #[serde(default)]
    pub description: Option<String>,

    /// Author display name
    #[serde(default)]
    pub author: Option<String>,

    /// Publication date
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Categories, either a YAML list or a comma-separated string
    #[serde(default, deserialize_with = "one_or_many")]
    pub categories: Vec<String>,

    /// Cover image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Custom slug override
    #[serde(default)]
    pub slug: Option<String>,

    /// Drafts are only listed on the dashboard
    #[serde(default)]
    pub draft: bool,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            author: None,
            date: None,
            categories: Vec::new(),
            image: None,
            slug: None,
            draft: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;

    let values = match raw {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => s.split(',').map(str::to_string).collect(),
        Some(OneOrMany::Many(v)) => v,
    };

    Ok(values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Extract frontmatter from a post.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    if frontmatter.title.trim().is_empty() {
        return Err(FrontmatterError::MissingField("title"));
    }

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Missing required frontmatter field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Shipping Rust at work
description: Notes from a year of production services
author: Mina
date: 2024-11-02
categories: [rust, backend]
---

# Shipping Rust at work
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title, "Shipping Rust at work");
        assert_eq!(fm.author.as_deref(), Some("Mina"));
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 11, 2));
        assert_eq!(fm.categories, vec!["rust", "backend"]);
        assert!(!fm.draft);
        assert!(content.starts_with("# Shipping Rust at work"));
    }

    #[test]
    fn splits_comma_separated_categories() {
        let source = "---\ntitle: Tips\ncategories: \"web, css ,, tooling\"\n---\nBody";

        let (fm, _) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.unwrap().categories, vec!["web", "css", "tooling"]);
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_blank_title() {
        let source = "---\ntitle: \"  \"\n---\nBody";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::MissingField("title"))));
    }
}
