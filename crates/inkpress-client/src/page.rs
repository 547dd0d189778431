//! Headless presentation surface: document, listeners, timers and viewport.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::clipboard::{Clipboard, ClipboardError, MemoryClipboard};
use crate::dom::{Document, NodeId};
use crate::events::{Event, EventKind, ListenerId, Listeners, Target};

/// Viewports at or below this width use the mobile behaviour.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Visible area and scroll position, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_y: 0.0,
        }
    }
}

/// Vertical layout of a node, relative to the top of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusOptions {
    pub prevent_scroll: bool,
}

/// Handle of a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce(&mut Page)>,
}

/// A rendered page as seen by client-side code.
///
/// Execution is single threaded: handlers and timer callbacks receive the
/// page mutably and run to completion one at a time.
pub struct Page {
    pub dom: Document,
    listeners: Listeners,
    timers: Vec<Timer>,
    next_timer: u64,
    now: Duration,
    viewport: Viewport,
    last_scroll: Option<ScrollBehavior>,
    layout: HashMap<NodeId, Rect>,
    focused: Option<NodeId>,
    selection: Option<String>,
    clipboard: Box<dyn Clipboard>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Document::new(), MemoryClipboard::new())
    }
}

impl Page {
    pub fn new(dom: Document, clipboard: impl Clipboard + 'static) -> Self {
        Self {
            dom,
            listeners: Listeners::default(),
            timers: Vec::new(),
            next_timer: 0,
            now: Duration::ZERO,
            viewport: Viewport::default(),
            last_scroll: None,
            layout: HashMap::new(),
            focused: None,
            selection: None,
            clipboard: Box::new(clipboard),
        }
    }

    // --- listeners ---

    /// Register a listener and return its handle.
    pub fn listen(
        &mut self,
        target: Target,
        kind: EventKind,
        handler: impl FnMut(&mut Page, &mut Event) + 'static,
    ) -> ListenerId {
        self.listeners
            .add(target, kind, Rc::new(RefCell::new(handler)))
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners registered for a specific target and kind.
    pub fn listeners_on(&self, target: Target, kind: EventKind) -> usize {
        self.listeners.count_for(target, kind)
    }

    /// Dispatch an event from its target up through the document to the window.
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        for current in self.propagation_path(event.target) {
            event.current_target = current;

            for (id, handler) in self.listeners.matching(current, event.kind) {
                // Skip listeners removed by an earlier handler in this dispatch
                if !self.listeners.contains(id) {
                    continue;
                }
                match handler.try_borrow_mut() {
                    Ok(mut handler) => (&mut *handler)(self, &mut event),
                    Err(_) => tracing::warn!("Skipping re-entrant {:?} listener", event.kind),
                }
            }

            if event.propagation_stopped() {
                break;
            }
        }

        event
    }

    fn propagation_path(&self, target: Target) -> Vec<Target> {
        match target {
            Target::Window => vec![Target::Window],
            Target::Document => vec![Target::Document, Target::Window],
            Target::Node(node) => {
                let mut path: Vec<Target> =
                    self.dom.ancestors_inclusive(node).map(Target::Node).collect();
                if self.dom.is_attached(node) {
                    path.push(Target::Document);
                    path.push(Target::Window);
                }
                path
            }
        }
    }

    /// Click a node.
    pub fn click(&mut self, node: NodeId) -> Event {
        self.dispatch(Event::click(node))
    }

    /// Press a key on the focused element, or the document when nothing is focused.
    pub fn key_down(&mut self, key: &str) -> Event {
        let target = self.key_target();
        self.dispatch(Event::key(EventKind::KeyDown, target, key))
    }

    /// Key press on a specific node.
    pub fn key_press(&mut self, node: NodeId, key: &str) -> Event {
        self.dispatch(Event::key(EventKind::KeyPress, Target::Node(node), key))
    }

    /// Touch gesture from `start_y` to `end_y` on a node.
    pub fn swipe(&mut self, node: NodeId, start_y: f64, end_y: f64) {
        self.dispatch(Event::touch(EventKind::TouchStart, node, start_y));
        self.dispatch(Event::touch(EventKind::TouchEnd, node, end_y));
    }

    fn key_target(&self) -> Target {
        match self.focused {
            Some(node) if self.dom.is_attached(node) => Target::Node(node),
            _ => Target::Document,
        }
    }

    // --- timers ---

    /// Run `callback` once after `delay` of page time.
    pub fn set_timeout(
        &mut self,
        delay: Duration,
        callback: impl FnOnce(&mut Page) + 'static,
    ) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            callback: Box::new(callback),
        });
        id
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Elapsed page time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move page time forward, firing due timers in order.
    pub fn advance(&mut self, by: Duration) {
        let until = self.now + by;

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= until)
                .min_by_key(|(_, t)| (t.due, t.id))
                .map(|(index, _)| index);

            let Some(index) = next else {
                break;
            };

            let timer = self.timers.remove(index);
            self.now = timer.due;
            (timer.callback)(self);
        }

        self.now = until;
    }

    // --- viewport and layout ---

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport.width <= MOBILE_BREAKPOINT
    }

    /// Change the viewport size and notify resize listeners.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.dispatch(Event::new(EventKind::Resize, Target::Window));
    }

    /// Scroll the window and notify scroll listeners.
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.viewport.scroll_y = top.max(0.0);
        self.last_scroll = Some(behavior);
        self.dispatch(Event::new(EventKind::Scroll, Target::Window));
    }

    /// Behaviour of the most recent programmatic scroll.
    pub fn last_scroll_behavior(&self) -> Option<ScrollBehavior> {
        self.last_scroll
    }

    /// Record where a node sits in the laid-out document.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        self.layout.insert(node, rect);
    }

    /// Layout of a node; nodes without recorded layout sit at the origin.
    pub fn layout(&self, node: NodeId) -> Rect {
        self.layout.get(&node).copied().unwrap_or_default()
    }

    /// Top of a node relative to the viewport.
    pub fn bounding_top(&self, node: NodeId) -> f64 {
        self.layout(node).top - self.viewport.scroll_y
    }

    // --- focus, selection and clipboard ---

    pub fn focus(&mut self, node: NodeId, options: FocusOptions) {
        self.focused = Some(node);
        if !options.prevent_scroll {
            if let Some(rect) = self.layout.get(&node).copied() {
                self.scroll_to(rect.top, ScrollBehavior::Instant);
            }
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Select the value of a form field, or the text of any other node.
    pub fn select(&mut self, node: NodeId) {
        let text = match self.dom.attr(node, "value") {
            Some(value) => value.to_string(),
            None => self.dom.text_content(node),
        };
        self.selection = Some(text);
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Write text through the clipboard API.
    pub fn write_clipboard(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.write_text(text)
    }

    /// Copy the current selection with the legacy copy command.
    pub fn exec_copy(&mut self) -> Result<(), ClipboardError> {
        let selection = self
            .selection
            .clone()
            .ok_or(ClipboardError::NothingSelected)?;
        self.clipboard.exec_copy(&selection)
    }
}
