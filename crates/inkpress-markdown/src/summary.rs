//! Plain-text summaries and reading-time estimates for Markdown posts.
//!
//! Both transforms are total: any input string produces a result, and
//! nothing here allocates shared state, so they are safe to call from
//! concurrent render requests.

use std::sync::LazyLock;

use regex::Regex;

/// Average reading speed used for estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// A single rewrite rule applied by [`strip_markdown`].
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid strip_markdown pattern"),
            replacement,
        }
    }
}

/// Rewrite rules in application order.
static STRIP_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // Fenced code blocks, content included
        Rule::new(r"(?s)```.*?```", ""),
        // Inline code keeps its text
        Rule::new(r"`([^`]*)`", "${1}"),
        // Images become their alt text
        Rule::new(r"!\[([^\]]*)\]\([^)]*\)", "${1}"),
        // Links become their text
        Rule::new(r"\[([^\]]+)\]\([^)]+\)", "${1}"),
        Rule::new(r"(?m)^#{1,6}\s*", ""),
        Rule::new(r"\*\*(.*?)\*\*", "${1}"),
        Rule::new(r"\*(.*?)\*", "${1}"),
        Rule::new(r"__(.*?)__", "${1}"),
        Rule::new(r"_(.*?)_", "${1}"),
        Rule::new(r"(?m)^>\s?", ""),
        Rule::new(r"(?m)^[\s*-]+", ""),
        Rule::new(r"<[^>]*>", ""),
        // Markers uncovered by the bullet and tag rules above
        Rule::new(r"(?m)^(?:[ \t]*#+[ \t]*)+", ""),
        Rule::new(r"\n{2,}", "\n"),
        Rule::new(r"[ \t]{2,}", " "),
    ]
});

/// Characters dropped before counting words.
const WORD_NOISE: &[char] = &['#', '*', '`', '[', ']', '(', ')'];

/// Strip Markdown syntax, leaving readable plain text.
///
/// Nested or overlapping emphasis markers are not resolved specially; the
/// rules run once each, in order, so `***a**b*` may keep a stray marker.
pub fn strip_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let mut text = markdown.to_string();
    for rule in STRIP_RULES.iter() {
        text = rule
            .pattern
            .replace_all(&text, rule.replacement)
            .into_owned();
    }

    text.trim().to_string()
}

/// Count whitespace-separated words after removing Markdown punctuation.
pub fn word_count(markdown: &str) -> usize {
    markdown
        .replace(WORD_NOISE, "")
        .split_whitespace()
        .count()
}

/// Estimate reading time in whole minutes.
///
/// Returns 0 for empty input and at least 1 for anything else.
pub fn estimate_reading_time(markdown: &str) -> usize {
    if markdown.is_empty() {
        return 0;
    }

    word_count(markdown).div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Render a reading-time estimate for display, e.g. `"3 min read"`.
pub fn format_reading_time(markdown: &str) -> String {
    format_minutes(estimate_reading_time(markdown).max(1))
}

/// Render a precomputed minute count for display.
pub fn format_minutes(minutes: usize) -> String {
    if minutes == 1 {
        "Less than 1 min read".to_string()
    } else {
        format!("{} min read", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn strips_common_syntax() {
        let md = r#"# Title

Some **bold** and *italic* text with `code` and a [link](https://example.com).

![A cat](cat.png)

> Quoted line
- first item
- second item

<div>raw</div>
"#;

        let text = strip_markdown(md);

        assert_eq!(
            text,
            "Title\nSome bold and italic text with code and a link.\nA cat\nQuoted line\nfirst item\nsecond item\nraw"
        );
    }

    #[test]
    fn removes_fenced_code_with_content() {
        let md = "Before\n\n```rust\nfn main() {}\n```\n\nAfter";

        assert_eq!(strip_markdown(md), "Before\nAfter");
    }

    #[test]
    fn handles_unterminated_fence() {
        let md = "Intro\n```js\nconsole.log('never closed')";

        let text = strip_markdown(md);

        assert!(!text.contains("```"));
        assert!(text.contains("never closed"));
    }

    #[test]
    fn underscore_emphasis() {
        assert_eq!(strip_markdown("__strong__ and _soft_"), "strong and soft");
    }

    #[test]
    fn collapses_horizontal_whitespace() {
        assert_eq!(strip_markdown("a   b\t\tc"), "a b c");
    }

    #[test]
    fn no_heading_markers_survive() {
        let cases = [
            "####### seven",
            "# # doubled",
            "- # inside a bullet",
            "<b># inside a tag</b>",
            "   ## indented",
        ];

        for md in cases {
            let text = strip_markdown(md);
            for line in text.lines() {
                assert!(!line.starts_with('#'), "{md:?} left {line:?}");
            }
        }
    }

    #[test]
    fn no_tags_survive() {
        let text = strip_markdown("<<b>>bold</b> <img src=\"x\"> <a\nhref=\"y\">z</a>");

        assert!(!text.contains("<b>"));
        assert!(!text.contains("<img"));
        assert!(!text.contains("<a"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(strip_markdown(""), "");
        assert_eq!(estimate_reading_time(""), 0);
    }

    #[test]
    fn reading_time_boundaries() {
        assert_eq!(estimate_reading_time(&words(1)), 1);
        assert_eq!(estimate_reading_time(&words(199)), 1);
        assert_eq!(estimate_reading_time(&words(200)), 1);
        assert_eq!(estimate_reading_time(&words(201)), 2);
        assert_eq!(estimate_reading_time(&words(1000)), 5);
    }

    #[test]
    fn reading_time_is_monotonic() {
        let mut last = 0;
        for n in (0..1200).step_by(37) {
            let minutes = estimate_reading_time(&words(n));
            assert!(minutes >= last);
            last = minutes;
        }
    }

    #[test]
    fn whitespace_only_input_reads_in_a_minute() {
        assert_eq!(estimate_reading_time("   \n\t"), 1);
    }

    #[test]
    fn punctuation_is_not_a_word() {
        assert_eq!(word_count("# Title\n\n**bold** [link](url) ` * "), 3);
    }

    #[test]
    fn formats_reading_time() {
        assert_eq!(format_minutes(1), "Less than 1 min read");
        assert_eq!(format_minutes(3), "3 min read");
        assert_eq!(format_reading_time(""), "Less than 1 min read");
        assert_eq!(format_reading_time(&words(450)), "3 min read");
    }
}
