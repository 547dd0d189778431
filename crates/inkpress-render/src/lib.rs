//! Page rendering for inkpress.
//!
//! Turns post Markdown into HTML and renders it through minijinja templates
//! with the blog's helper filters.

pub mod assets;
pub mod context;
mod error;
pub mod helpers;
pub mod markdown;
pub mod templates;

pub use assets::AssetPipeline;
pub use context::{RenderContext, Sections, SiteInfo};
pub use error::RenderError;
pub use markdown::render_markdown;
pub use templates::TemplateEngine;
