//! Summarize Markdown files from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use inkpress_markdown::{format_minutes, parse_post, title_from_file_name};

/// Summary of one Markdown file.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub title: String,
    pub words: usize,
    pub reading_minutes: usize,
    pub reading_time: String,
    pub plain_text: String,
}

/// Run the summarize command.
pub fn run(files: &[PathBuf], json: bool) -> Result<()> {
    let summaries = files
        .iter()
        .map(|path| summarize_file(path))
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", summary.title);
        println!("  {} words, {}", summary.words, summary.reading_time);
        if !summary.plain_text.is_empty() {
            println!("  {}", preview(&summary.plain_text, 160));
        }
    }

    Ok(())
}

pub fn summarize_file(path: &Path) -> Result<FileSummary> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed =
        parse_post(&source).with_context(|| format!("Failed to parse {}", path.display()))?;

    let title = parsed.title().map(str::to_string).unwrap_or_else(|| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        title_from_file_name(name)
    });

    Ok(FileSummary {
        path: path.to_path_buf(),
        title,
        words: parsed.word_count,
        reading_minutes: parsed.reading_minutes,
        reading_time: format_minutes(parsed.reading_minutes.max(1)),
        plain_text: parsed.plain_text,
    })
}

/// First `limit` characters on one line.
fn preview(text: &str, limit: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > limit {
        let cut: String = flat.chars().take(limit).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn summarizes_post_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("long-read.md");
        let body = "word ".repeat(450);
        fs::write(&path, format!("---\ntitle: Long Read\n---\n# Intro\n\n{}", body)).unwrap();

        let summary = summarize_file(&path).unwrap();

        assert_eq!(summary.title, "Long Read");
        assert_eq!(summary.words, 451);
        assert_eq!(summary.reading_minutes, 3);
        assert_eq!(summary.reading_time, "3 min read");
        assert!(summary.plain_text.starts_with("Intro"));
    }

    #[test]
    fn title_falls_back_to_file_name() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("quick-note.md");
        fs::write(&path, "Just a line.").unwrap();

        let summary = summarize_file(&path).unwrap();

        assert_eq!(summary.title, "Quick Note");
        assert_eq!(summary.reading_time, "Less than 1 min read");
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempdir().unwrap();
        assert!(summarize_file(&temp.path().join("nope.md")).is_err());
    }

    #[test]
    fn preview_flattens_and_cuts() {
        assert_eq!(preview("a\n\nb  c", 10), "a b c");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
