//! Markdown handling for inkpress posts.
//!
//! This crate parses post files (YAML frontmatter plus Markdown body), derives
//! heading outlines, and provides the plain-text and reading-time transforms used
//! by templates.

pub mod frontmatter;
pub mod parser;
pub mod slug;
pub mod summary;

pub use frontmatter::Frontmatter;
pub use parser::{markdown_options, parse_post, Heading, ParseError, ParsedPost};
pub use slug::{slugify, title_from_file_name, HeadingIds};
pub use summary::{
    estimate_reading_time, format_minutes, format_reading_time, strip_markdown, word_count,
    WORDS_PER_MINUTE,
};
