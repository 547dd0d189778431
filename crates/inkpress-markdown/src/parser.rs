//! Post document parser.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::slug::HeadingIds;
use crate::summary::{estimate_reading_time, strip_markdown, word_count};

/// A parsed post document.
#[derive(Debug, Clone)]
pub struct ParsedPost {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Heading outline in document order
    pub outline: Vec<Heading>,

    /// Plain-text rendering of the content
    pub plain_text: String,

    /// Words counted for the reading-time estimate
    pub word_count: usize,

    /// Estimated reading time in minutes
    pub reading_minutes: usize,
}

impl ParsedPost {
    /// Title from frontmatter, falling back to the first level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .map(|f| f.title.as_str())
            .or_else(|| {
                self.outline
                    .iter()
                    .find(|h| h.level == 1)
                    .map(|h| h.title.as_str())
            })
    }
}

/// A heading found in the post body.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing a post.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Markdown extensions enabled for posts.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse a post: frontmatter, heading outline, summary and reading time.
pub fn parse_post(source: &str) -> Result<ParsedPost, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let mut found = Vec::new();
    let mut current_heading: Option<(u8, Option<String>, String)> = None; // (level, explicit id, text)

    for event in Parser::new_ext(content, markdown_options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current_heading = Some((level as u8, id.map(|i| i.to_string()), String::new()));
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current_heading.take() {
                    found.push(heading);
                }
            }

            _ => {}
        }
    }

    let mut ids = HeadingIds::new();
    for (_, id, _) in &found {
        if let Some(id) = id {
            ids.reserve(id);
        }
    }

    let outline = found
        .into_iter()
        .map(|(level, id, title)| {
            let id = id.or_else(|| ids.assign(&title)).unwrap_or_default();
            Heading { title, id, level }
        })
        .collect();

    Ok(ParsedPost {
        frontmatter,
        content: content.to_string(),
        outline,
        plain_text: strip_markdown(content),
        word_count: word_count(content),
        reading_minutes: estimate_reading_time(content),
    })
}
