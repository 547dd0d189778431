//! Client side of inkpress.
//!
//! A headless model of a rendered page ([`Page`]) and the enhancement
//! pipeline that runs over article content, plus cart helpers backed by
//! pluggable [`Storage`].

pub mod builder;
pub mod cart;
pub mod clipboard;
pub mod dom;
pub mod enhance;
pub mod events;
pub mod page;
pub mod storage;

pub use builder::CONTENT_CLASS;
pub use cart::{Cart, CartItem, Product};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use dom::{Document, NodeId};
pub use enhance::{initialize, Enhancement, Enhancer, Highlighter, Stage};
pub use events::{Event, EventKind, ListenerId, Subscription, Target};
pub use page::{FocusOptions, Page, Rect, ScrollBehavior, TimerId, Viewport};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
