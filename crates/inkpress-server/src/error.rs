//! Server, store and request errors.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use inkpress_markdown::ParseError;
use inkpress_render::RenderError;

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors loading posts from disk.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Posts directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("Cannot derive a slug for {}", .0.display())]
    EmptySlug(PathBuf),
}

/// Why a request could not be answered with its page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Failed to render page: {0}")]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to visitors. Render failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(message) => message.clone(),
            AppError::Render(_) => "Something went wrong while rendering this page.".to_string(),
        }
    }
}

/// A rendered error page.
#[derive(Debug)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_variant() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);

        let render = AppError::from(RenderError::Css("bad".into()));
        assert_eq!(render.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!render.public_message().contains("bad"));
    }
}
