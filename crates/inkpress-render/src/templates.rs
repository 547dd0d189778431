//! Template engine for blog pages.

use std::path::{Path, PathBuf};

use minijinja::Environment;

use crate::context::RenderContext;
use crate::helpers;
use crate::RenderError;

/// Template engine using minijinja.
///
/// Templates come from an optional override directory first and fall back to
/// the built-in set.
pub struct TemplateEngine {
    env: Environment<'static>,
    overrides: Option<PathBuf>,
}

impl TemplateEngine {
    /// Create an engine with only the built-in templates.
    pub fn new() -> Self {
        Self::with_overrides(None)
    }

    /// Create an engine that looks in `dir` before the built-in templates.
    pub fn with_overrides(dir: Option<PathBuf>) -> Self {
        let mut env = Environment::new();

        let fs_loader = dir.clone().map(minijinja::path_loader);
        env.set_loader(move |name| {
            if let Some(load) = &fs_loader {
                if let Some(source) = load(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(builtin(name).map(str::to_string))
        });

        helpers::register(&mut env);

        Self {
            env,
            overrides: dir,
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.overrides.as_deref()
    }

    /// Render a template by name.
    pub fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template)?;
        Ok(tmpl.render(context)?)
    }

    /// Drop cached templates so edited overrides are picked up.
    pub fn reload(&mut self) {
        self.env.clear_templates();
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of the built-in templates.
pub const TEMPLATES: [&str; 6] = [
    "base.html",
    "index.html",
    "post.html",
    "category.html",
    "dashboard.html",
    "error.html",
];

fn builtin(name: &str) -> Option<&'static str> {
    Some(match name {
        "base.html" => BASE_TEMPLATE,
        "index.html" => INDEX_TEMPLATE,
        "post.html" => POST_TEMPLATE,
        "category.html" => CATEGORY_TEMPLATE,
        "dashboard.html" => DASHBOARD_TEMPLATE,
        "error.html" => ERROR_TEMPLATE,
        "post_card.html" => POST_CARD_TEMPLATE,
        _ => return None,
    })
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title %}{{ title }} | {% endif %}{{ site.title }}</title>
  {% if site.description %}<meta name="description" content="{{ site.description }}">{% endif %}
  <link rel="canonical" href="{{ canonical_url(site.base_url, path) }}">
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
  <link rel="stylesheet" href="/Assets/inkpress.css">
  {% if sections.head %}{{ sections.head | safe }}{% endif %}
</head>
<body>
  <div class="reading-progress" aria-hidden="true"></div>
  <header class="site-header">
    <a href="/" class="site-logo">{{ site.title }}</a>
    <nav class="site-nav">
      <a href="/">Posts</a>
      <a href="/dashboard">Dashboard</a>
    </nav>
  </header>
  <main class="site-main">
    {% block content %}{% endblock %}
  </main>
  <footer class="site-footer">
    <a href="/sitemap.xml">Sitemap</a>
  </footer>
  {% if sections.scripts %}{{ sections.scripts | safe }}{% endif %}
</body>
</html>"##;

const POST_CARD_TEMPLATE: &str = r##"<article class="post-card">
  <h2><a href="/post/{{ post.slug | urlencode_component }}">{{ post.title }}</a></h2>
  <p class="post-meta">
    {% if post.date %}<time datetime="{{ post.date }}">{{ post.date | format_date }}</time> &middot; {% endif %}
    <span class="reading-time">{{ post.reading_minutes | format_minutes }}</span>
  </p>
  <p class="post-summary">{{ (post.description or post.summary) | truncate(200) }}</p>
  {% if post.categories %}
  <ul class="post-categories">
    {% for category in post.categories %}
    <li><a href="/category/{{ category | urlencode_component }}">{{ category }}</a></li>
    {% endfor %}
  </ul>
  {% endif %}
</article>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="post-list">
  {% for post in posts %}
  {% include "post_card.html" %}
  {% else %}
  <p class="empty">No posts yet.</p>
  {% endfor %}
</section>
{% endblock %}"##;

const CATEGORY_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="post-list">
  <h1 class="category-title">{{ category }}</h1>
  {% for post in posts %}
  {% include "post_card.html" %}
  {% endfor %}
</section>
{% endblock %}"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="post">
  <header class="post-header">
    <h1>{{ post.title }}</h1>
    <p class="post-meta">
      {% if post.author %}<span class="author">{{ post.author }}</span> &middot; {% endif %}
      {% if post.date %}<time datetime="{{ post.date }}">{{ post.date | format_date }}</time> &middot; {% endif %}
      <span class="reading-time">{{ post.reading_minutes | format_minutes }}</span>
    </p>
    {% if post.image %}<img class="post-cover" src="{{ post.image }}" alt="{{ post.title }}">{% endif %}
  </header>
  <div class="markdown-content">
    {{ post.html | safe }}
  </div>
  {% if post.categories %}
  <footer class="post-footer">
    {% for category in post.categories %}
    <a class="category-tag" href="/category/{{ category | urlencode_component }}">{{ category }}</a>
    {% endfor %}
  </footer>
  {% endif %}
</article>
{% endblock %}"##;

const DASHBOARD_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="dashboard">
  <h1>Dashboard</h1>
  <p class="dashboard-summary">{{ posts | length }} posts, {{ drafts }} drafts, {{ total_words }} words</p>
  <table class="dashboard-table">
    <thead>
      <tr><th>Title</th><th>Date</th><th>Words</th><th>Reading time</th><th>Status</th></tr>
    </thead>
    <tbody>
      {% for post in posts %}
      <tr{% if post.draft %} class="draft"{% endif %}>
        <td><a href="/post/{{ post.slug | urlencode_component }}">{{ post.title }}</a></td>
        <td>{% if post.date %}{{ post.date | format_date }}{% endif %}</td>
        <td>{{ post.word_count }}</td>
        <td>{{ post.reading_minutes | format_minutes }}</td>
        <td>{% if post.draft %}Draft{% else %}Published{% endif %}</td>
      </tr>
      {% endfor %}
    </tbody>
  </table>
</section>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="error-page">
  <h1>{{ code }}</h1>
  <p>{{ message }}</p>
  <a href="/">Back to posts</a>
</section>
{% endblock %}"##;
