//! Blog server for inkpress.
//!
//! Serves post listings, post pages, the dashboard, a search index and a
//! sitemap from Markdown files, reloading them when they change on disk.

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod watcher;

pub use config::ServerConfig;
pub use error::{AppError, ServerError, StoreError};
pub use server::{router, BlogServer, ServerState, SharedState};
pub use store::{Post, PostStore};
pub use watcher::{FileWatcher, WatchEvent};
