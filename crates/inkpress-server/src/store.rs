//! In-memory post store loaded from a directory of Markdown files.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use inkpress_markdown::{parse_post, slugify, title_from_file_name};
use inkpress_render::render_markdown;

use crate::error::StoreError;

/// Words kept in a post's listing summary.
const SUMMARY_WORDS: usize = 40;

/// A loaded post, serialized as the `post`/`posts` template values.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub image: Option<String>,
    pub draft: bool,
    /// Leading words of the plain text
    pub summary: String,
    pub word_count: usize,
    pub reading_minutes: usize,
    /// Rendered body
    pub html: String,
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Post {
    pub fn url(&self) -> String {
        format!("/post/{}", self.slug)
    }

    pub fn in_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Posts from one directory, newest first.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
    posts: Vec<Post>,
}

impl PostStore {
    /// Load every `.md` file under `dir`.
    ///
    /// Files that fail to read or parse are logged and skipped.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StoreError::MissingDir(dir));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("md" | "markdown")
                )
            })
            .collect();
        paths.sort();

        let loaded: Vec<Result<Post, StoreError>> =
            paths.par_iter().map(|path| load_post(path)).collect();

        let mut seen = HashSet::new();
        let mut posts = Vec::with_capacity(loaded.len());
        for result in loaded {
            match result {
                Ok(post) => {
                    if seen.insert(post.slug.clone()) {
                        posts.push(post);
                    } else {
                        tracing::warn!(
                            "Skipping {}: slug '{}' is already taken",
                            post.source_path.display(),
                            post.slug
                        );
                    }
                }
                Err(e) => tracing::warn!("Skipping post: {}", e),
            }
        }

        posts.sort_by(newest_first);
        tracing::debug!("Loaded {} posts from {}", posts.len(), dir.display());

        Ok(Self { dir, posts })
    }

    /// Re-read the directory, keeping the current posts on failure.
    pub fn reload(&mut self) -> Result<usize, StoreError> {
        let fresh = Self::load(self.dir.clone())?;
        *self = fresh;
        Ok(self.posts.len())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every post, drafts included.
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    /// Posts visible on public listings.
    pub fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.draft)
    }

    /// Look a post up by slug. Drafts are found too so they can be previewed.
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn in_category<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Post> {
        self.published().filter(move |p| p.in_category(name))
    }

    /// Published post count per category.
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for post in self.published() {
            for category in &post.categories {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn draft_count(&self) -> usize {
        self.posts.iter().filter(|p| p.draft).count()
    }

    pub fn total_words(&self) -> usize {
        self.posts.iter().map(|p| p.word_count).sum()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn load_post(path: &Path) -> Result<Post, StoreError> {
    let source = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_post(&source).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    let title = parsed
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| title_from_file_name(file_name));

    let frontmatter = parsed.frontmatter.clone().unwrap_or_default();

    let slug = frontmatter
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(stem));
    if slug.is_empty() {
        return Err(StoreError::EmptySlug(path.to_path_buf()));
    }

    let summary = parsed
        .plain_text
        .split_whitespace()
        .take(SUMMARY_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Post {
        slug,
        title,
        description: frontmatter.description,
        author: frontmatter.author,
        date: frontmatter.date,
        categories: frontmatter.categories,
        image: frontmatter.image,
        draft: frontmatter.draft,
        summary,
        word_count: parsed.word_count,
        reading_minutes: parsed.reading_minutes,
        html: render_markdown(&parsed.content),
        source_path: path.to_path_buf(),
    })
}

/// Dated posts newest first, then undated posts by title.
fn newest_first(a: &Post, b: &Post) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.title.cmp(&b.title)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}
