//! Clipboard capability injected into a page.

use std::cell::RefCell;
use std::rc::Rc;

/// Errors reported by a clipboard backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard access denied")]
    Denied,

    #[error("Clipboard operation not supported")]
    Unsupported,

    #[error("Nothing is selected")]
    NothingSelected,
}

/// System clipboard access.
pub trait Clipboard {
    /// Write text through the asynchronous clipboard API.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Copy the current selection with the legacy copy command.
    fn exec_copy(&mut self, _selection: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}

#[derive(Debug, Default)]
struct ClipboardState {
    contents: Option<String>,
    api_denied: bool,
    legacy_denied: bool,
    legacy_copies: usize,
}

/// In-memory clipboard. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    state: Rc<RefCell<ClipboardState>>,
}

impl MemoryClipboard {
    /// A clipboard where both copy paths succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose async API is denied but whose legacy command works.
    pub fn legacy_only() -> Self {
        let clipboard = Self::default();
        clipboard.state.borrow_mut().api_denied = true;
        clipboard
    }

    /// A clipboard where every copy fails.
    pub fn unavailable() -> Self {
        let clipboard = Self::legacy_only();
        clipboard.state.borrow_mut().legacy_denied = true;
        clipboard
    }

    /// Current clipboard text.
    pub fn contents(&self) -> Option<String> {
        self.state.borrow().contents.clone()
    }

    /// Number of successful legacy copies.
    pub fn legacy_copies(&self) -> usize {
        self.state.borrow().legacy_copies
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut state = self.state.borrow_mut();
        if state.api_denied {
            return Err(ClipboardError::Denied);
        }
        state.contents = Some(text.to_string());
        Ok(())
    }

    fn exec_copy(&mut self, selection: &str) -> Result<(), ClipboardError> {
        let mut state = self.state.borrow_mut();
        if state.legacy_denied {
            return Err(ClipboardError::Unsupported);
        }
        state.contents = Some(selection.to_string());
        state.legacy_copies += 1;
        Ok(())
    }
}
